use std::io;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Stdin, Stdout};
use tokio_stream::{wrappers::LinesStream, StreamExt};

/// Line-oriented console: one line in per prompt, every write flushed.
pub struct Console<R, W> {
    input: LinesStream<R>,
    output: W,
}

impl Console<BufReader<Stdin>, Stdout> {
    pub fn stdio() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
    }
}

impl<R, W> Console<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(input: R, output: W) -> Self {
        Self {
            input: LinesStream::new(input.lines()),
            output,
        }
    }

    /// Writes `prompt` and waits for the next line, without its line ending.
    ///
    /// Returns `None` once the input is exhausted.
    pub async fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        self.write(prompt).await?;
        self.input.next().await.transpose()
    }

    pub async fn write(&mut self, text: &str) -> io::Result<()> {
        self.output.write_all(text.as_bytes()).await?;
        self.output.flush().await
    }

    pub async fn writeln(&mut self, text: &str) -> io::Result<()> {
        self.output.write_all(text.as_bytes()).await?;
        self.write("\n").await
    }

    /// Releases the input side and hands back the output.
    pub fn close(self) -> W {
        self.output
    }
}
