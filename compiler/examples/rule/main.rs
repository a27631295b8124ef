use std::io::{self, BufRead};

use rule_compiler::build_dsl;
use rule_runtime::dot::DotGeneratable;
use rule_runtime::matcher::{Matcher, WildcardExecutor};

const USAGE: &str = "rule [--debug|--dot] RULE";

fn main() -> Result<(), String> {
    env_logger::init();

    let (debug, dot, args) =
        std::env::args()
            .skip(1)
            .fold((false, false, vec![]), |(debug, dot, mut args), arg| {
                match arg.as_str() {
                    "--debug" | "-d" => (true, dot, args),
                    "--dot" => (debug, true, args),
                    _ => {
                        args.push(arg);
                        (debug, dot, args)
                    }
                }
            });

    let rule = match args.as_slice() {
        [rule] => Ok(rule.as_str()),
        _ => Err(USAGE.to_string()),
    }?;

    let automaton = build_dsl(rule).map_err(|e| e.to_string())?;

    if debug {
        println!(
            "DEBUG
--------
{}--------
",
            automaton
        )
    }

    if dot {
        println!("{}", automaton.to_dot());
        return Ok(());
    }

    let matcher = Matcher::new(automaton).with_executor(WildcardExecutor::default());
    for line in io::stdin().lock().lines() {
        match line {
            Ok(line) => match matcher.execute(&line) {
                Ok(true) => println!("{}", line),
                Ok(false) => continue,
                Err(e) => return Err(e.to_string()),
            },
            Err(e) => return Err(format!("{}", e)),
        }
    }

    Ok(())
}
