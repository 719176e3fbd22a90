//! Subcommand handlers. Each takes its parsed arguments plus the output
//! streams and returns `Result<(), CliError>`.

pub mod bench;
pub mod cfg;
pub mod deal;
pub mod eval;
pub mod sim;

pub use bench::handle_bench_command;
pub use cfg::handle_cfg_command;
pub use deal::handle_deal_command;
pub use eval::handle_eval_command;
pub use sim::handle_sim_command;
