use std::io::Write;

use plc_core::lexer::prelude::Lexer;

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
			_ => {
				let lexer = Lexer::new(input.char_indices().map(|(i, c)| (i as u32, c)));

				for res in lexer {
					match res {
						Ok(token) => {
							println!("{token:?}");
						}
						Err(err) => {
							let (message, messages) = err.details();
							println!("[at {}] Lexical Error: {}", err.location.start, message);
							if !messages.is_empty() {
								println!("{}", messages.join("\n"));
							}
							break;
						}
					}
				}
			}
		}
	}
}
