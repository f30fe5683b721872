use minijvm::{ClassFile, Error, Vm};

fn main() -> Result<(), Error> {
    env_logger::init();

    let cli = clap::Command::new("minijvm")
        .about("Decode class files and run integer methods")
        .subcommand_required(true)
        .subcommand(
            clap::Command::new("methods")
                .about("List the methods of a class file")
                .arg(clap::arg!(<FILE> "class file to decode")),
        )
        .subcommand(
            clap::Command::new("run")
                .about("Execute a method and print its result")
                .arg(clap::arg!(<FILE> "class file to run"))
                .arg(clap::arg!(<METHOD> "method name, e.g. sum"))
                .arg(clap::arg!(<DESCRIPTOR> "method descriptor, e.g. (I)I"))
                .arg(
                    clap::arg!([ARGS] ... "integer arguments")
                        .value_parser(clap::value_parser!(i32))
                        .allow_negative_numbers(true),
                ),
        );

    let matches = cli.get_matches();
    match matches.subcommand() {
        Some(("methods", submatches)) => {
            let filename = submatches
                .get_one::<String>("FILE")
                .expect("required");
            let class_file = ClassFile::from_path(filename)?;
            for method in class_file.methods() {
                println!("{method}");
            }
        }
        Some(("run", submatches)) => {
            let filename = submatches
                .get_one::<String>("FILE")
                .expect("required");
            let method = submatches
                .get_one::<String>("METHOD")
                .expect("required");
            let descriptor = submatches
                .get_one::<String>("DESCRIPTOR")
                .expect("required");
            let arguments: Vec<i32> = submatches
                .get_many::<i32>("ARGS")
                .map(|values| values.copied().collect())
                .unwrap_or_default();

            log::info!("Running {method}{descriptor} from '{filename}'");
            let result = Vm::new().execute(filename, method, descriptor, &arguments)?;
            println!("{result}");
        }
        _ => unreachable!("subcommand_required"),
    }
    Ok(())
}
