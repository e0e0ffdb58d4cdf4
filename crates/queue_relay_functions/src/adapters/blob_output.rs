/// Destination for the content of one relayed message.
pub trait BlobOutput {
    fn write_blob(&mut self, content: &str) -> Result<(), String>;
}

/// Output binding slot handed to one invocation.
///
/// The Functions host names and writes the blob after the invocation
/// returns; the slot only carries the content and accepts a single write.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct OutputBindingSlot {
    content: Option<String>,
}

impl OutputBindingSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    pub fn into_content(self) -> Option<String> {
        self.content
    }
}

impl BlobOutput for OutputBindingSlot {
    fn write_blob(&mut self, content: &str) -> Result<(), String> {
        if self.content.is_some() {
            return Err("output blob slot was already written".to_string());
        }
        self.content = Some(content.to_string());
        Ok(())
    }
}
