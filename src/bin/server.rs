//! ChatKit relay server.
//! Run with: cargo run --bin chatkit-server

use std::process::ExitCode;

use chatkit_client::start_chatkit;

fn main() -> ExitCode {
    start_chatkit::run()
}
