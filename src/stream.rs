use crate::map::VxlMap;

use tracing::debug;

/// Produces a map's encoded bytes in caller-bounded chunks, so a network
/// sender can transmit progressively without materializing the whole buffer.
///
/// The stream borrows the map for its whole lifetime, which is what locks the
/// map: mutating during streaming is a borrow error rather than a runtime
/// check. Dropping the stream releases the map.
pub struct VxlStream<'a> {
    map: &'a VxlMap,
    /// Byte offset of each column in the encoded stream; the final entry is
    /// the total size.
    offsets: Vec<usize>,
    chunk_size: usize,
    pos: usize,
    scratch: Vec<u8>,
}

impl<'a> VxlStream<'a> {
    /// Opens a stream, encoding every column once to build the offset table.
    pub fn new(map: &'a VxlMap, chunk_size: usize) -> Self {
        assert!(chunk_size >= 1);

        let columns = (map.width() * map.height()) as usize;
        let mut offsets = Vec::with_capacity(columns + 1);
        offsets.push(0);
        let mut scratch = Vec::new();
        let mut total = 0;
        for y in 0..map.height() {
            for x in 0..map.width() {
                scratch.clear();
                map.encode_column_into(x, y, &mut scratch);
                total += scratch.len();
                offsets.push(total);
            }
        }
        debug!(columns, total, chunk_size, "opened vxl stream");

        VxlStream {
            map,
            offsets,
            chunk_size,
            pos: 0,
            scratch,
        }
    }

    /// Total encoded size of the map.
    pub fn len(&self) -> usize {
        self.offsets.last().copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bytes produced so far.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Copies the next `min(chunk_size, out.len(), remaining)` bytes of the
    /// encoded stream into `out` and returns the count; 0 once the stream is
    /// exhausted.
    ///
    /// The stream remembers only a byte position. Columns are re-encoded into
    /// an internal buffer as the position passes through them, so a column
    /// straddling two reads is encoded twice; that costs O(depth) and keeps
    /// the state trivial.
    pub fn read(&mut self, out: &mut [u8]) -> usize {
        let total = self.len();
        if self.pos >= total {
            return 0;
        }
        let end = (self.pos + self.chunk_size.min(out.len())).min(total);

        let width = self.map.width() as usize;
        let mut column = self.offsets.partition_point(|&o| o <= self.pos) - 1;
        let mut written = 0;
        while self.pos < end {
            let column_start = self.offsets[column];
            let x = (column % width) as u32;
            let y = (column / width) as u32;
            self.scratch.clear();
            self.map.encode_column_into(x, y, &mut self.scratch);
            debug_assert_eq!(self.scratch.len(), self.offsets[column + 1] - column_start);

            let from = self.pos - column_start;
            let to = (end - column_start).min(self.scratch.len());
            out[written..written + to - from].copy_from_slice(&self.scratch[from..to]);
            written += to - from;
            self.pos += to - from;
            column += 1;
        }

        written
    }
}

// ████████╗███████╗███████╗████████╗███████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝
//    ██║   █████╗  ███████╗   ██║   ███████╗
//    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║
//    ██║   ███████╗███████║   ██║   ███████║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝
