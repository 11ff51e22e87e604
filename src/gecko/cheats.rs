// Sat Jan 17 2026 - Alex

use crate::gecko::command::{CMD_CHEAT_EXEC, CMD_SEND_CHEATS};
use crate::gecko::error::{GeckoError, GeckoResult};
use crate::gecko::session::Gecko;
use crate::gecko::transfer::{ChunkAck, ChunkPlan, TransferSummary, ACK_ATTEMPTS, UPLOAD_PACKET_SIZE};
use crate::utils::{parse_hex, BinaryUtils};
use std::io::Read;

pub const CHEAT_HEADER: u64 = 0x00D0_C0DE_00D0_C0DE;
pub const CHEAT_TERMINATOR: u64 = 0xF000_0000_0000_0000;
const TERMINATOR_MASK: u64 = 0xFE00_0000_0000_0000;
const ALT_TERMINATOR: u64 = 0xFE00_0000_0000_0000;

fn is_terminator(word: u64) -> bool {
    let masked = word & TERMINATOR_MASK;
    masked == CHEAT_TERMINATOR || masked == ALT_TERMINATOR
}

/// Makes sure a code list starts with the `00D0C0DE` header and ends with a
/// terminator line. Running it twice changes nothing.
pub fn normalize_cheat_stream(data: &[u8]) -> GeckoResult<Vec<u8>> {
    if data.len() % 8 != 0 {
        return Err(GeckoError::CheatStreamSizeInvalid(data.len()));
    }

    let mut stream = data.to_vec();

    let terminated = stream.len() >= 8
        && BinaryUtils::read_u64_be(&stream, stream.len() - 8)
            .map(is_terminator)
            .unwrap_or(false);
    if !terminated {
        stream.extend_from_slice(&CHEAT_TERMINATOR.to_be_bytes());
    }

    if BinaryUtils::read_u64_be(&stream, 0) != Some(CHEAT_HEADER) {
        let mut with_header = CHEAT_HEADER.to_be_bytes().to_vec();
        with_header.extend_from_slice(&stream);
        stream = with_header;
    }

    Ok(stream)
}

/// Parses code text such as `04001234 00000001`, one or more codes per
/// line. Anything after `#` is ignored.
pub fn parse_cheat_text(text: &str) -> Option<Vec<u8>> {
    let hex: String = text
        .lines()
        .map(|line| line.split('#').next().unwrap_or(""))
        .collect::<Vec<_>>()
        .join("");
    parse_hex(&hex)
}

impl Gecko {
    pub fn send_cheats<R: Read>(&mut self, source: &mut R) -> GeckoResult<TransferSummary> {
        let mut raw = Vec::new();
        source.read_to_end(&mut raw)?;
        if raw.len() % 8 != 0 {
            return Err(GeckoError::CheatStreamSizeInvalid(raw.len()));
        }

        self.init_gecko()?;
        let stream = normalize_cheat_stream(&raw)?;
        let length = stream.len() as u32;

        self.raw_command(CMD_SEND_CHEATS)?;
        self.wait_for_ack(ACK_ATTEMPTS)?;
        self.send(&length.to_be_bytes())?;
        log::debug!("Sending {} cheat lines", length / 8);

        let plan = ChunkPlan::new(length, UPLOAD_PACKET_SIZE);
        let mut cursor = 0usize;
        self.send_chunks(&plan, ChunkAck::Device, &mut |buf| {
            buf.copy_from_slice(&stream[cursor..cursor + buf.len()]);
            cursor += buf.len();
            Ok(())
        })
    }

    pub fn send_cheat_bytes(&mut self, codes: &[u8]) -> GeckoResult<TransferSummary> {
        self.send_cheats(&mut std::io::Cursor::new(codes))
    }

    pub fn execute_cheats(&mut self) -> GeckoResult<()> {
        self.raw_command(CMD_CHEAT_EXEC)
    }
}
