use std::borrow::Cow;
use stratus_derive::stratus_error;

#[stratus_error]
pub enum DemoError {
    #[error("Conflict{}", format_context(.context))]
    Conflict { context: Option<Cow<'static, str>> },

    #[error("Missing {name}")]
    Missing { name: String },
}

fn main() {
    let _ = DemoError::Missing { name: "settings".to_owned() }.to_string();
}
