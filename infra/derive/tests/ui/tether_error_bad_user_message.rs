use tether_derive::tether_error;

#[tether_error]
pub enum DemoError {
    #[user_message(42)]
    #[error("Internal error: {message}")]
    Internal { message: String, context: Option<std::borrow::Cow<'static, str>> },
}

fn main() {}
