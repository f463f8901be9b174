//! Consumer Control HID support (report id 3) - media keys, volume, channel.
//!
//! The report is a packed 2-byte bitfield rather than a single usage code:
//!
//! ```text
//! Byte 0: bits 0-3 numeric key pad (unused, always 0)
//!         bits 4-5 channel, 2-bit signed (+1 = 0b01, -1 = 0b11)
//!         bit 6    volume up
//!         bit 7    volume down
//! Byte 1: bits 0-3 button (Mute 1 .. Stop 12)
//!         bits 4-5 selection (unused, always 0)
//!         bits 6-7 padding
//! ```

/// Consumer control report size in bytes.
pub const CONSUMER_REPORT_SIZE: usize = 2;

const CHANNEL_UP: u8 = 0x10;
const CHANNEL_DOWN: u8 = 0x30;
const VOLUME_UP: u8 = 0x40;
const VOLUME_DOWN: u8 = 0x80;

/// Consumer commands the remote can send, identified by their HID
/// Consumer page usage id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum ConsumerCommand {
    Power = 48,
    AssignSelection = 129,
    RecallLast = 131,
    ChannelUp = 156,
    ChannelDown = 157,
    Play = 176,
    Pause = 177,
    Record = 178,
    FastForward = 179,
    Rewind = 180,
    ScanNextTrack = 181,
    ScanPrevTrack = 182,
    Stop = 183,
    Mute = 226,
    VolumeUp = 233,
    VolumeDown = 234,
}

impl ConsumerCommand {
    pub const fn usage_id(self) -> u8 {
        self as u8
    }

    pub const fn from_usage_id(id: u8) -> Option<Self> {
        Some(match id {
            48 => ConsumerCommand::Power,
            129 => ConsumerCommand::AssignSelection,
            131 => ConsumerCommand::RecallLast,
            156 => ConsumerCommand::ChannelUp,
            157 => ConsumerCommand::ChannelDown,
            176 => ConsumerCommand::Play,
            177 => ConsumerCommand::Pause,
            178 => ConsumerCommand::Record,
            179 => ConsumerCommand::FastForward,
            180 => ConsumerCommand::Rewind,
            181 => ConsumerCommand::ScanNextTrack,
            182 => ConsumerCommand::ScanPrevTrack,
            183 => ConsumerCommand::Stop,
            226 => ConsumerCommand::Mute,
            233 => ConsumerCommand::VolumeUp,
            234 => ConsumerCommand::VolumeDown,
            _ => return None,
        })
    }

    /// Bytes of the press report for this command.
    const fn press_bytes(self) -> [u8; 2] {
        match self {
            ConsumerCommand::ChannelUp => [CHANNEL_UP, 0],
            ConsumerCommand::ChannelDown => [CHANNEL_DOWN, 0],
            ConsumerCommand::VolumeUp => [VOLUME_UP, 0],
            ConsumerCommand::VolumeDown => [VOLUME_DOWN, 0],
            ConsumerCommand::Mute => [0, 1],
            ConsumerCommand::Power => [0, 2],
            ConsumerCommand::RecallLast => [0, 3],
            ConsumerCommand::AssignSelection => [0, 4],
            ConsumerCommand::Play => [0, 5],
            ConsumerCommand::Pause => [0, 6],
            ConsumerCommand::Record => [0, 7],
            ConsumerCommand::FastForward => [0, 8],
            ConsumerCommand::Rewind => [0, 9],
            ConsumerCommand::ScanNextTrack => [0, 10],
            ConsumerCommand::ScanPrevTrack => [0, 11],
            ConsumerCommand::Stop => [0, 12],
        }
    }
}

impl From<ConsumerCommand> for u8 {
    fn from(command: ConsumerCommand) -> u8 {
        command.usage_id()
    }
}

impl TryFrom<u8> for ConsumerCommand {
    type Error = u8;

    fn try_from(id: u8) -> Result<Self, u8> {
        ConsumerCommand::from_usage_id(id).ok_or(id)
    }
}

/// Encode a consumer command. Unknown usage ids and `pressed = false`
/// both give the all-released report `[0, 0]`.
pub const fn consumer_command_report(command_id: u8, pressed: bool) -> [u8; 2] {
    if !pressed {
        return [0, 0];
    }
    match ConsumerCommand::from_usage_id(command_id) {
        Some(command) => command.press_bytes(),
        None => [0, 0],
    }
}

/// Consumer Control HID report.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ConsumerReport {
    pub bytes: [u8; CONSUMER_REPORT_SIZE],
}

impl ConsumerReport {
    /// Create an empty (no keys pressed) report.
    pub const fn empty() -> Self {
        Self { bytes: [0, 0] }
    }

    pub const fn press(command: ConsumerCommand) -> Self {
        Self {
            bytes: consumer_command_report(command.usage_id(), true),
        }
    }

    pub fn serialize(&self, buf: &mut [u8]) -> usize {
        if buf.len() < CONSUMER_REPORT_SIZE {
            return 0;
        }
        buf[..CONSUMER_REPORT_SIZE].copy_from_slice(&self.bytes);
        CONSUMER_REPORT_SIZE
    }

    pub fn is_empty(&self) -> bool {
        self.bytes == [0, 0]
    }
}
