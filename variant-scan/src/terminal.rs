//! Terminal host
//!
//! Line-oriented stand-in for the POS screen: barcodes and selection
//! answers are read from the same input, popups are printed to the output.

use std::io::Write;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader, Lines};

use crate::operator::{ErrorPopup, OperatorPrompt, SelectionPopup};

type BoxedReader = Box<dyn AsyncRead + Send + Unpin>;

/// Shared line input
pub struct LineReader {
    lines: tokio::sync::Mutex<Lines<BufReader<BoxedReader>>>,
}

impl LineReader {
    pub fn stdin() -> Self {
        Self::from_reader(tokio::io::stdin())
    }

    pub fn from_reader(reader: impl AsyncRead + Send + Unpin + 'static) -> Self {
        let boxed: BoxedReader = Box::new(reader);
        Self {
            lines: tokio::sync::Mutex::new(BufReader::new(boxed).lines()),
        }
    }

    /// Next line, `None` at end of input
    pub async fn next_line(&self) -> Option<String> {
        match self.lines.lock().await.next_line().await {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read input line");
                None
            }
        }
    }
}

/// Renders popups as text and reads selections by number
pub struct TerminalOperator {
    input: Arc<LineReader>,
    output: Mutex<Box<dyn Write + Send>>,
}

impl TerminalOperator {
    pub fn new(input: Arc<LineReader>) -> Self {
        Self::with_output(input, std::io::stdout())
    }

    pub fn with_output(input: Arc<LineReader>, output: impl Write + Send + 'static) -> Self {
        Self {
            input,
            output: Mutex::new(Box::new(output)),
        }
    }

    fn print(&self, text: &str) {
        let mut out = self.output.lock();
        if let Err(e) = out.write_all(text.as_bytes()).and_then(|_| out.flush()) {
            tracing::warn!(error = %e, "Failed to write to terminal");
        }
    }
}

#[async_trait]
impl OperatorPrompt for TerminalOperator {
    async fn show_error(&self, popup: ErrorPopup) {
        self.print(&format!("\n!! {}\n   {}\n", popup.title, popup.body));
    }

    async fn select(&self, popup: SelectionPopup) -> Option<usize> {
        let mut text = format!("\n== {}\n   {}\n", popup.title, popup.body);
        for (i, item) in popup.items.iter().enumerate() {
            text.push_str(&format!("   {}) {}\n", i + 1, item));
        }
        self.print(&text);

        let prompt = format!(
            "Number to {}, empty or 'c' to {}: ",
            popup.confirm_text.to_lowercase(),
            popup.cancel_text.to_lowercase()
        );
        loop {
            self.print(&prompt);
            let line = self.input.next_line().await?;
            let answer = line.trim();
            if answer.is_empty() || answer.eq_ignore_ascii_case("c") {
                return None;
            }
            match answer.parse::<usize>() {
                Ok(n) if (1..=popup.items.len()).contains(&n) => return Some(n - 1),
                _ => self.print(&format!("Invalid choice: {answer}\n")),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl SharedBuf {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock()).into_owned()
        }
    }

    fn popup() -> SelectionPopup {
        SelectionPopup {
            title: "Select Variant".into(),
            body: "Pick one".into(),
            items: vec!["Shirt (Red, S)".into(), "Shirt (Blue, M)".into()],
            confirm_text: "Add".into(),
            cancel_text: "Cancel".into(),
        }
    }

    fn operator(input: &str) -> (TerminalOperator, SharedBuf) {
        let reader = LineReader::from_reader(std::io::Cursor::new(input.as_bytes().to_vec()));
        let out = SharedBuf::default();
        (
            TerminalOperator::with_output(Arc::new(reader), out.clone()),
            out,
        )
    }

    #[tokio::test]
    async fn test_select_by_number() {
        let (operator, out) = operator("2\n");
        assert_eq!(operator.select(popup()).await, Some(1));
        assert!(out.text().contains("1) Shirt (Red, S)"));
        assert!(out.text().contains("2) Shirt (Blue, M)"));
    }

    #[tokio::test]
    async fn test_invalid_then_valid() {
        let (operator, out) = operator("7\nx\n1\n");
        assert_eq!(operator.select(popup()).await, Some(0));
        assert!(out.text().contains("Invalid choice: 7"));
    }

    #[tokio::test]
    async fn test_cancel() {
        for input in ["\n", "c\n", ""] {
            let (operator, _) = operator(input);
            assert_eq!(operator.select(popup()).await, None);
        }
    }

    #[tokio::test]
    async fn test_error_popup_is_printed() {
        let (operator, out) = operator("");
        operator
            .show_error(ErrorPopup::new("Invalid Barcode", "The barcode 0000000 could not be found."))
            .await;
        assert!(out.text().contains("!! Invalid Barcode"));
    }

    #[tokio::test]
    async fn test_line_reader() {
        let reader = LineReader::from_reader(std::io::Cursor::new(b"a\nb\n".to_vec()));
        assert_eq!(reader.next_line().await.as_deref(), Some("a"));
        assert_eq!(reader.next_line().await.as_deref(), Some("b"));
        assert_eq!(reader.next_line().await, None);
    }
}
