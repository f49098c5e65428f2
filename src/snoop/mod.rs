//! Snoop protocol: a fixed-size binary request/reply exchange used to
//! reset or sample the statistics of a running monitor instance.
//!
//! A request is 2 bytes (big-endian command code); a reply is 6 bytes
//! (big-endian result code followed by a 4-byte entry count, meaningful
//! for sample replies and zero otherwise).

pub mod client;
pub mod server;

pub const REQUEST_LEN: usize = 2;
pub const REPLY_LEN: usize = 6;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SnoopCommand {
    ResetStatistics,
    SamplePerformance,
}

impl SnoopCommand {
    const RESET: u16 = 1;
    const SAMPLE: u16 = 2;

    pub fn encode(self) -> [u8; REQUEST_LEN] {
        let code = match self {
            SnoopCommand::ResetStatistics => Self::RESET,
            SnoopCommand::SamplePerformance => Self::SAMPLE,
        };
        code.to_be_bytes()
    }

    pub fn decode(buf: [u8; REQUEST_LEN]) -> Option<SnoopCommand> {
        match u16::from_be_bytes(buf) {
            Self::RESET => Some(SnoopCommand::ResetStatistics),
            Self::SAMPLE => Some(SnoopCommand::SamplePerformance),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SnoopReply {
    pub code: ReplyCode,
    pub entry_count: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReplyCode {
    Ok = 0,
    Error = 1,
}

impl SnoopReply {
    pub fn ok(entry_count: u32) -> Self {
        SnoopReply {
            code: ReplyCode::Ok,
            entry_count,
        }
    }

    pub fn error() -> Self {
        SnoopReply {
            code: ReplyCode::Error,
            entry_count: 0,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.code == ReplyCode::Ok
    }

    pub fn encode(self) -> [u8; REPLY_LEN] {
        let mut buf = [0u8; REPLY_LEN];
        buf[0..2].copy_from_slice(&(self.code as u16).to_be_bytes());
        buf[2..6].copy_from_slice(&self.entry_count.to_be_bytes());
        buf
    }

    pub fn decode(buf: [u8; REPLY_LEN]) -> Option<SnoopReply> {
        let code = match u16::from_be_bytes([buf[0], buf[1]]) {
            0 => ReplyCode::Ok,
            1 => ReplyCode::Error,
            _ => return None,
        };
        let entry_count = u32::from_be_bytes([buf[2], buf[3], buf[4], buf[5]]);
        Some(SnoopReply { code, entry_count })
    }
}
