//! Interactive read-answer loop.

use std::io::{self, BufRead, Write};

const BANNER: &str = "============================================================
Elasticsearch Agent
============================================================

Available commands:
  - Ask questions in natural language
  - Type 'exit' or 'quit' to exit
  - Type 'help' for examples
";

const EXAMPLES: &str = "
Example queries:

Search queries:
  - Find all users registered in the last week
  - Search for products with 'laptop' in the description
  - Show me documents where status is 'active'

Index management:
  - Create index 'products' with name and price fields
  - Insert a document with name='John' and age=30 into users
  - Delete the 'old_data' index

Analytics:
  - What are the top 10 most common product categories?
  - Calculate average price of all products
  - Show me the distribution of users by country
";

/// Runs the interactive loop until `exit`, `quit` or end of input.
///
/// Blank lines are ignored and `help` prints example queries. Every other
/// line is passed to `answer` and the result is printed.
pub fn run<R, W, F>(input: R, output: &mut W, mut answer: F) -> io::Result<()>
where
    R: BufRead,
    W: Write,
    F: FnMut(&str) -> String,
{
    writeln!(output, "{BANNER}")?;
    let mut lines = input.lines();

    loop {
        write!(output, "You: ")?;
        output.flush()?;

        let Some(line) = lines.next().transpose()? else {
            writeln!(output, "\nGoodbye!")?;
            return Ok(());
        };
        let line = line.trim();

        match line.to_lowercase().as_str() {
            "" => {}
            "exit" | "quit" => {
                writeln!(output, "Goodbye!")?;
                return Ok(());
            }
            "help" => writeln!(output, "{EXAMPLES}")?,
            _ => {
                let reply = answer(line);
                writeln!(output, "\nAgent: {reply}\n")?;
            }
        }
    }
}
