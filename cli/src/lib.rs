pub mod merfil_commands;
pub mod pipeline;
