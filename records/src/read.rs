use crate::error::SequenceError;

const BASES: [u8; 4] = [b'a', b'c', b'g', b't'];

/// A single position of a [PackedSequence](PackedSequence).
/// `code` is the 2-bit base code (A=0, C=1, G=2, T=3); `ambiguous` is set
/// for any input character outside ACGT, in which case `code` is always 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Base {
    pub code: u8,
    pub ambiguous: bool,
}

/// A DNA sequence packed to 2 bits per base plus 1 ambiguity bit per base.
///
/// The data block holds `ceil(len/4)` bytes, the flag block `ceil(len/8)`
/// bytes. An ambiguous position always stores code 0 and padding bits past
/// `len` are always zero, so the derived equality and hash agree with
/// positional `(code, ambiguous)` comparison.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackedSequence {
    len: usize,
    data: Vec<u8>,
    flags: Vec<u8>,
}

impl PackedSequence {
    pub fn from_text(sequence: &str) -> Self {
        let mut packed = Self::zeroed(sequence.len());
        for (i, ch) in sequence.bytes().enumerate() {
            let base = match ch {
                b'a' | b'A' => Base { code: 0, ambiguous: false },
                b'c' | b'C' => Base { code: 1, ambiguous: false },
                b'g' | b'G' => Base { code: 2, ambiguous: false },
                b't' | b'T' => Base { code: 3, ambiguous: false },
                _ => Base { code: 0, ambiguous: true },
            };
            packed.set_base(i, base);
        }
        packed
    }

    // All-zero scratch sequence, used as the target of substring/complement/reverse.
    fn zeroed(len: usize) -> Self {
        Self {
            len,
            data: vec![0; (len + 3) / 4],
            flags: vec![0; (len + 7) / 8],
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn base_at(&self, index: usize) -> Result<Base, SequenceError> {
        if index >= self.len {
            return Err(SequenceError::OutOfRange { index, length: self.len });
        }
        let code = (self.data[index >> 2] >> ((index & 3) << 1)) & 3;
        let ambiguous = (self.flags[index >> 3] >> (index & 7)) & 1 == 1;
        Ok(Base { code, ambiguous })
    }

    fn set_base(&mut self, index: usize, base: Base) {
        assert!(index < self.len, "set_base at {} of {}", index, self.len);
        let (d_index, d_shift) = (index >> 2, (index & 3) << 1);
        self.data[d_index] &= !(3 << d_shift);
        self.data[d_index] |= (base.code & 3) << d_shift;
        let (f_index, f_shift) = (index >> 3, index & 7);
        self.flags[f_index] &= !(1 << f_shift);
        self.flags[f_index] |= (base.ambiguous as u8) << f_shift;
    }

    /// True iff no position is flagged ambiguous.
    pub fn is_definite(&self) -> bool {
        self.flags.iter().all(|&f| f == 0)
    }

    pub fn substring(&self, start: usize, len: usize) -> Result<Self, SequenceError> {
        if len == 0 || start + len > self.len {
            return Err(SequenceError::InvalidRange { start, len, length: self.len });
        }
        let mut sub = Self::zeroed(len);
        for i in 0..len {
            let base = self.base_at(start + i)?;
            sub.set_base(i, base);
        }
        Ok(sub)
    }

    /// Base-pair complement (A<->T, C<->G) at every definite position.
    /// Ambiguity flags are untouched and the base order is NOT reversed;
    /// compose with [reverse](Self::reverse) for a reverse complement.
    pub fn complement(&self) -> Self {
        let mut comp = Self::zeroed(self.len);
        for i in 0..self.len {
            // Bounds are ours, base_at cannot fail.
            let base = self.base_at(i).unwrap();
            let code = if base.ambiguous { base.code } else { 3 - base.code };
            comp.set_base(i, Base { code, ambiguous: base.ambiguous });
        }
        comp
    }

    /// Mirror the base order, carrying codes and flags.
    pub fn reverse(&self) -> Self {
        let mut rev = Self::zeroed(self.len);
        for i in 0..self.len {
            let base = self.base_at(i).unwrap();
            rev.set_base(self.len - i - 1, base);
        }
        rev
    }

    pub fn to_text(&self) -> String {
        (0..self.len)
            .map(|i| {
                let base = self.base_at(i).unwrap();
                if base.ambiguous {
                    'n'
                } else {
                    BASES[base.code as usize] as char
                }
            })
            .collect()
    }
}

impl std::fmt::Display for PackedSequence {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.to_text())
    }
}

impl From<&str> for PackedSequence {
    fn from(sequence: &str) -> Self {
        Self::from_text(sequence)
    }
}

impl std::str::FromStr for PackedSequence {
    type Err = std::convert::Infallible;
    fn from_str(sequence: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_text(sequence))
    }
}
