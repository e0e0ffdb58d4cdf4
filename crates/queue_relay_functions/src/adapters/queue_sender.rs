/// Sends one message body to a queue bound at construction time.
pub trait QueueSender {
    fn send_message(&self, body: &str) -> Result<(), String>;
}

impl<T: QueueSender + ?Sized> QueueSender for &T {
    fn send_message(&self, body: &str) -> Result<(), String> {
        (**self).send_message(body)
    }
}
