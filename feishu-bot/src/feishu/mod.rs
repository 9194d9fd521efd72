//! Feishu transport: inbound event callback payloads and the outbound reply client.

mod client;
mod payload;

pub use client::FeishuBot;
pub use payload::{
    Callback, EventHeader, EventMention, EventMessage, EventSender, MessageEventBody,
    MessageReceiveEvent, SenderIds, MESSAGE_RECEIVE_EVENT,
};
