use anyhow::Result;

use nfa_regex::compile;

fn main() -> Result<()> {
    env_logger::init();

    let regex = compile("[a-zA-Z][a-zA-Z0-9_.]+@[a-zA-Z0-9]+.[a-zA-Z]{2,}")?;
    log::debug!("checking sample inputs against {}", regex.as_str());

    let samples = ["valid_email@example.com", "user@sub.domain.1a"];
    for sample in samples {
        if regex.matches(sample) {
            println!("{}: match", sample);
        } else {
            println!("{}: no match", sample);
        }
    }
    Ok(())
}
