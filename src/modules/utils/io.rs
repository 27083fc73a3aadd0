use std::io::{self, Write};

/// Helper function to read a line from stdin
pub fn read_line() -> io::Result<String> {
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

/// Print a prompt without a newline and read the answer
pub fn prompt(label: &str) -> io::Result<String> {
    print!("{}", label);
    io::stdout().flush()?;
    read_line()
}

/// Prompt with a prefilled default; an empty answer keeps the default
pub fn prompt_with_default(label: &str, default: Option<&str>) -> io::Result<String> {
    match default {
        Some(value) if !value.is_empty() => {
            let answer = prompt(&format!("{} [{}]: ", label, value))?;
            if answer.is_empty() {
                Ok(value.to_string())
            } else {
                Ok(answer)
            }
        }
        _ => prompt(&format!("{}: ", label)),
    }
}

/// Prompt for a password without echoing it
pub fn prompt_password(label: &str) -> io::Result<String> {
    print!("{}: ", label);
    io::stdout().flush()?;
    rpassword::read_password()
}
