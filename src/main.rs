use std::process;

fn main() {
    if let Err(err) = quire::main() {
        eprintln!("error: {}", err);

        for cause in err.iter_causes() {
            eprintln!("  caused by: {}", cause);
        }

        eprintln!("{}", err.backtrace());

        process::exit(1);
    }
}
