use std::process::ExitCode;

fn main() -> ExitCode {
    inventario_cli::run()
}
