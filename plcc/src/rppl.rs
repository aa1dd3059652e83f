use std::io::Write;

use plc_core::parser::prelude::parse_source_str;

const PROMPT: &str = ">> ";

pub fn start() -> std::io::Result<()> {
	let stdin = std::io::stdin();

	loop {
		let mut input = String::from("");

		print!("{}", PROMPT);
		std::io::stdout().flush()?;
		stdin.read_line(&mut input)?;

		if let Some('\n') = input.chars().next_back() {
			input.pop();
		}
		if let Some('\r') = input.chars().next_back() {
			input.pop();
		}

		match input.as_str() {
			"" => {}
			".exit" => return Ok(()),
			_ => match parse_source_str(&input) {
				Ok(source) => {
					println!("{source}");
				}
				Err(err) => {
					let (message, messages) = err.details();

					println!("Parse error: {}.\n\t{}", message, messages.join(";\n\t"))
				}
			},
		}
	}
}
