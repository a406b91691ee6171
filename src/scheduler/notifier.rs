use crate::{
    transport::{Markup, MessageId, Messenger, TransportError},
    util::parser::RawEntry,
};

pub(crate) const UNTITLED: &str = "(no title)";

pub struct Notifier<'a> {
    messenger: &'a dyn Messenger,
}

impl<'a> Notifier<'a> {
    pub fn new(messenger: &'a dyn Messenger) -> Self {
        Self { messenger }
    }

    pub async fn notify(&self, entry: &RawEntry) -> Result<MessageId, TransportError> {
        let markup = self.messenger.markup();
        self.messenger
            .send(&render(entry, markup), Some(markup), true)
            .await
    }
}

pub fn render(entry: &RawEntry, markup: Markup) -> String {
    let title = entry.title.as_deref().unwrap_or(UNTITLED);
    let link = entry.link.as_deref().unwrap_or_default();

    format!("{}\n{}", markup.bold(title), markup.link("Read more", link))
}
