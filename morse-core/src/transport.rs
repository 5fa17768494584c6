//! Inbound transport messages
//!
//! The transport exposes three write endpoints. Each write is decoded into
//! [`Message`]s and handed to the context's dispatcher. Links without
//! endpoints (a UART) frame the same messages in a byte stream, see
//! [`SerialFramer`].

use core::slice;

/// Request delivered by the transport
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Message {
    /// Character to translate and play
    Letter(u8),
    /// New volume, 0..=255
    Volume(u8),
    /// Discard everything pending and silence the actuators
    Abort,
}

/// Write endpoints of the transport service
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Endpoint {
    Letter,
    Volume,
    Abort,
}

impl Endpoint {
    /// 16-bit identifier of the service grouping the endpoints
    pub const SERVICE_UUID16: u16 = 0xABCD;

    /// 16-bit identifier of this endpoint
    pub const fn uuid16(&self) -> u16 {
        match self {
            Endpoint::Letter => 0x0000,
            Endpoint::Volume => 0x0001,
            Endpoint::Abort => 0x0002,
        }
    }

    pub const fn from_uuid16(uuid: u16) -> Option<Endpoint> {
        match uuid {
            0x0000 => Some(Endpoint::Letter),
            0x0001 => Some(Endpoint::Volume),
            0x0002 => Some(Endpoint::Abort),
            _ => None,
        }
    }
}

/// Messages carried by one endpoint write
pub struct Decoded<'a> {
    endpoint: Endpoint,
    payload: slice::Iter<'a, u8>,
    done: bool,
}

impl Iterator for Decoded<'_> {
    type Item = Message;

    fn next(&mut self) -> Option<Message> {
        if self.done {
            return None;
        }
        match self.endpoint {
            Endpoint::Letter => self.payload.next().map(|&b| Message::Letter(b)),
            Endpoint::Volume => {
                self.done = true;
                self.payload.next().map(|&b| Message::Volume(b))
            }
            Endpoint::Abort => {
                self.done = true;
                Some(Message::Abort)
            }
        }
    }
}

/// Decode a write into messages.
///
/// A letter write yields one message per payload byte (batch sends put a
/// whole text in one write). A volume write uses its first byte and yields
/// nothing when empty. An abort write yields one abort whatever its payload.
pub fn decode_write(endpoint: Endpoint, payload: &[u8]) -> Decoded<'_> {
    Decoded {
        endpoint,
        payload: payload.iter(),
        done: false,
    }
}

/// Byte-stream framing for serial links
pub struct SerialFramer {
    volume_next: bool,
}

impl SerialFramer {
    /// CAN, requests an abort
    pub const ABORT: u8 = 0x18;
    /// DC1, the following byte is a volume
    pub const VOLUME: u8 = 0x11;

    pub const fn new() -> Self {
        Self { volume_next: false }
    }

    /// Consume one received byte. CR and LF are ignored; every other byte is
    /// a letter.
    pub fn feed(&mut self, byte: u8) -> Option<Message> {
        if self.volume_next {
            self.volume_next = false;
            return Some(Message::Volume(byte));
        }

        match byte {
            Self::ABORT => Some(Message::Abort),
            Self::VOLUME => {
                self.volume_next = true;
                None
            }
            b'\r' | b'\n' => None,
            _ => Some(Message::Letter(byte)),
        }
    }
}

impl Default for SerialFramer {
    fn default() -> Self {
        Self::new()
    }
}
