use std::io::Write;
use crate::utils::*;
use crate::io::{parse_size, Result};

/// Line-oriented prompting for the interactive front end. End of input
/// reads as `None` everywhere, which the caller treats as "Exit".
pub struct Console<R: BufRead, W: Write> {
    input:  R,
    output: W,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Prints `prompt` and reads one trimmed line.
    pub fn ask(&mut self, prompt: &str) -> Result<Option<String>> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;
        let mut buf = String::new();
        if self.input.read_line(&mut buf)? == 0 {
            return Ok(None);
        }

        Ok(Some(buf.trim().to_string()))
    }

    /// Writes a whole line to the output.
    pub fn say(&mut self, line: &str) -> Result<()> {
        writeln!(self.output, "{line}")?;

        Ok(())
    }

    /// Keeps asking until a positive number is typed in, complaining
    /// with `complaint` after every bad answer.
    fn ask_positive(&mut self, prompt: &str, complaint: &str) -> Result<Option<ByteSteps>> {
        loop {
            let Some(ans) = self.ask(prompt)? else { return Ok(None) };
            match parse_size(&ans) {
                Some(s) => return Ok(Some(s)),
                None    => self.say(complaint)?,
            }
        }
    }

    /// Keeps asking until a positive size is typed in.
    pub fn ask_size(&mut self, prompt: &str) -> Result<Option<ByteSteps>> {
        self.ask_positive(prompt, "Invalid size. Try again.")
    }

    /// Asks for the number of partitions and then for each size.
    ///
    /// Sizes are collected as they are typed, so an absurd count costs
    /// nothing until the sizes actually arrive.
    pub fn ask_partitions(&mut self) -> Result<Option<Vec<ByteSteps>>> {
        let Some(n) = self.ask_positive("Enter number of partitions: ", "Invalid number. Try again.")? else {
            return Ok(None)
        };
        let mut sizes = vec![];
        for i in 0..n {
            let Some(s) = self.ask_size(&format!("Enter size of Partition {}: ", i + 1))? else {
                return Ok(None)
            };
            sizes.push(s);
        }
        info!(partitions = sizes.len(), "Partition sizes read from the console");

        Ok(Some(sizes))
    }

    pub fn into_output(self) -> W { self.output }
}
