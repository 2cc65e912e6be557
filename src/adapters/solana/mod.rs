pub mod rpc;

pub use rpc::{SolanaHolderClient, TokenProgram, TOKEN_2022_PROGRAM_ID, TOKEN_PROGRAM_ID};
