//! Fixed-size character chunking over a UTF-8 byte stream.
//!
//! The reader never holds more than one chunk (plus one read buffer) of the
//! document. Offsets are counted in `char`s, matching the offsets annotation
//! intervals are expressed in.

use std::io::{self, Read};

/// Default chunk size, in characters.
pub const DEFAULT_CHUNK_SIZE: usize = 500 * 1024;

const READ_BUFFER_BYTES: usize = 8 * 1024;

/// A piece of the document together with its position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Global offset of the first character.
    pub start: usize,
    pub text: String,
    /// Length of `text` in characters.
    pub char_len: usize,
}

impl Chunk {
    /// Global offset one past the last character.
    pub fn end(&self) -> usize {
        self.start + self.char_len
    }
}

/// Pulls a character stream in chunks of `chunk_size` characters.
pub struct ChunkReader<R> {
    inner: R,
    chunk_size: usize,
    global_offset: usize,
    /// Decoded text not yet handed out.
    decoded: String,
    decoded_chars: usize,
    /// Trailing bytes of an incomplete UTF-8 sequence.
    undecoded: Vec<u8>,
    eof: bool,
}

impl<R: Read> ChunkReader<R> {
    /// `chunk_size` is clamped to at least one character.
    pub fn new(inner: R, chunk_size: usize) -> Self {
        if chunk_size == 0 {
            tracing::warn!("chunk size of zero clamped to one character");
        }
        Self {
            inner,
            chunk_size: chunk_size.max(1),
            global_offset: 0,
            decoded: String::new(),
            decoded_chars: 0,
            undecoded: Vec::new(),
            eof: false,
        }
    }

    /// Starts counting offsets at `offset` instead of zero.
    ///
    /// Used when the caller feeds one pre-segmented piece of a larger
    /// document at a time.
    pub fn starting_at(mut self, offset: usize) -> Self {
        self.global_offset = offset;
        self
    }

    /// Total characters handed out so far, plus the starting offset.
    pub fn global_offset(&self) -> usize {
        self.global_offset
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Returns the next chunk, or `None` once the stream is exhausted.
    ///
    /// Every chunk except the last holds exactly `chunk_size` characters.
    pub fn next_chunk(&mut self) -> io::Result<Option<Chunk>> {
        while self.decoded_chars < self.chunk_size && !self.eof {
            self.fill()?;
        }
        if self.decoded_chars == 0 {
            return Ok(None);
        }

        let take = self.chunk_size.min(self.decoded_chars);
        let split = if take == self.decoded_chars {
            self.decoded.len()
        } else {
            self.decoded
                .char_indices()
                .nth(take)
                .map_or(self.decoded.len(), |(idx, _)| idx)
        };
        let rest = self.decoded.split_off(split);
        let text = std::mem::replace(&mut self.decoded, rest);
        self.decoded_chars -= take;

        let chunk = Chunk {
            start: self.global_offset,
            text,
            char_len: take,
        };
        self.global_offset += take;

        tracing::trace!(start = chunk.start, chars = chunk.char_len, "read chunk");
        Ok(Some(chunk))
    }

    fn fill(&mut self) -> io::Result<()> {
        let mut buf = [0u8; READ_BUFFER_BYTES];
        let n = loop {
            match self.inner.read(&mut buf) {
                Ok(n) => break n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        };

        if n == 0 {
            self.eof = true;
            if !self.undecoded.is_empty() {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    "stream ended inside a UTF-8 sequence",
                ));
            }
            return Ok(());
        }

        self.undecoded.extend_from_slice(&buf[..n]);
        let valid = match std::str::from_utf8(&self.undecoded) {
            Ok(_) => self.undecoded.len(),
            Err(e) if e.error_len().is_none() => e.valid_up_to(),
            Err(e) => return Err(io::Error::new(io::ErrorKind::InvalidData, e)),
        };
        let text = std::str::from_utf8(&self.undecoded[..valid])
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        self.decoded_chars += text.chars().count();
        self.decoded.push_str(text);
        self.undecoded.drain(..valid);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Hands out at most `step` bytes per read, to split UTF-8 sequences.
    struct Trickle<'a> {
        bytes: &'a [u8],
        step: usize,
    }

    impl Read for Trickle<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let n = self.step.min(buf.len()).min(self.bytes.len());
            buf[..n].copy_from_slice(&self.bytes[..n]);
            self.bytes = &self.bytes[n..];
            Ok(n)
        }
    }

    fn collect(mut reader: ChunkReader<impl Read>) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        while let Some(chunk) = reader.next_chunk().unwrap() {
            chunks.push(chunk);
        }
        chunks
    }

    #[test]
    fn splits_into_fixed_character_chunks() {
        let chunks = collect(ChunkReader::new("abcdefgh".as_bytes(), 3));
        let texts: Vec<_> = chunks.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["abc", "def", "gh"]);
        assert_eq!(chunks[1].start, 3);
        assert_eq!(chunks[2].end(), 8);
    }

    #[test]
    fn counts_characters_not_bytes() {
        let chunks = collect(ChunkReader::new("héllo wörld".as_bytes(), 4));
        assert_eq!(chunks[0].text, "héll");
        assert_eq!(chunks[1].start, 4);
        assert_eq!(chunks.iter().map(|c| c.char_len).sum::<usize>(), 11);
    }

    #[test]
    fn reassembles_sequences_split_across_reads() {
        let text = "日本語のテキスト";
        let reader = ChunkReader::new(
            Trickle {
                bytes: text.as_bytes(),
                step: 1,
            },
            5,
        );
        let joined: String = collect(reader).into_iter().map(|c| c.text).collect();
        assert_eq!(joined, text);
    }

    #[test]
    fn starting_offset_shifts_chunks() {
        let mut reader = ChunkReader::new("abc".as_bytes(), 10).starting_at(100);
        let chunk = reader.next_chunk().unwrap().unwrap();
        assert_eq!((chunk.start, chunk.end()), (100, 103));
        assert_eq!(reader.global_offset(), 103);
        assert!(reader.next_chunk().unwrap().is_none());
    }

    #[test]
    fn empty_stream_has_no_chunks() {
        assert!(collect(ChunkReader::new(io::empty(), 4)).is_empty());
    }

    #[test]
    fn invalid_utf8_is_an_error() {
        let bytes: &[u8] = &[b'a', 0xff, b'b'];
        let mut reader = ChunkReader::new(bytes, 8);
        let err = reader.next_chunk().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn truncated_sequence_at_eof_is_an_error() {
        let bytes: &[u8] = &[b'a', 0xe6, 0x97];
        let mut reader = ChunkReader::new(bytes, 8);
        assert!(reader.next_chunk().is_err());
    }

    #[test]
    fn zero_chunk_size_is_clamped() {
        let reader = ChunkReader::new("ab".as_bytes(), 0);
        assert_eq!(reader.chunk_size(), 1);
    }
}
