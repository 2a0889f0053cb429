use crate::chunk::{Block, Chunk};
use crate::geometry::Geometry;
use crate::key::PackedKey;
use crate::DEFAULT_COLOR;

use thiserror::Error;
use tracing::warn;

/// Errors from decoding a VXL byte stream.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The buffer ended inside a span record or color word.
    #[error("input truncated at offset {offset}: need {expected} more bytes, got {actual}")]
    Truncated {
        offset: usize,
        expected: usize,
        actual: usize,
    },
    /// A span's z fields do not fit the map depth or contradict each other.
    #[error("span at offset {offset} has a z range outside the column")]
    SpanRange { offset: usize },
    /// A span's word count is too small to hold its own top colors.
    #[error("span at offset {offset}: length {length} cannot hold {colors} top colors")]
    SpanLength {
        offset: usize,
        length: u8,
        colors: u32,
    },
    /// Bytes were left over after the last column was decoded.
    #[error("{remaining} trailing bytes after the last column")]
    TrailingData { remaining: usize },
}

/// The fixed 4-byte record header.
///
/// `length` counts the 4-byte words of the whole record including the header;
/// 0 marks the final record of a column. `color_start..=color_end` is the
/// record's top color run and `air_start` is the z where the air above the
/// record's solid begins. A record's bottom colors are positioned by the
/// *next* record's `air_start`, so they can only be placed once the following
/// header has been read.
struct Span {
    length: u8,
    color_start: u8,
    color_end: u8,
    air_start: u8,
}

impl Span {
    const SIZE: usize = 4;

    fn read(data: &[u8], offset: usize) -> Result<Span, DecodeError> {
        if data.len() < offset + Self::SIZE {
            return Err(DecodeError::Truncated {
                offset,
                expected: Self::SIZE,
                actual: data.len().saturating_sub(offset),
            });
        }

        Ok(Span {
            length: data[offset],
            color_start: data[offset + 1],
            color_end: data[offset + 2],
            air_start: data[offset + 3],
        })
    }
}

fn read_word(data: &[u8], offset: usize) -> Result<u32, DecodeError> {
    if data.len() < offset + 4 {
        return Err(DecodeError::Truncated {
            offset,
            expected: 4,
            actual: data.len().saturating_sub(offset),
        });
    }

    Ok(u32::from_le_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ]))
}

/// Decodes one column's records, marking solid voxels in `geometry` and
/// appending color entries to `chunk`. Columns are decoded in key order, so
/// the appends use the chunk's sorted bulk path.
pub(crate) fn decode_column(
    data: &[u8],
    offset: &mut usize,
    x: u32,
    y: u32,
    geometry: &mut Geometry,
    chunk: &mut Chunk,
) -> Result<(), DecodeError> {
    let depth = geometry.depth();
    // First z not yet covered by a record; records must move down the column
    // so the chunk appends stay in ascending key order.
    let mut cursor = 0;

    loop {
        let at = *offset;
        let span = Span::read(data, at)?;

        let top_start = span.color_start as u32;
        let top_len = (span.color_end as u32 + 1).saturating_sub(top_start);
        if top_start > depth || top_start < cursor || (top_len > 0 && span.color_end as u32 >= depth)
        {
            return Err(DecodeError::SpanRange { offset: at });
        }

        for i in 0..top_len {
            let color = read_word(data, at + Span::SIZE + 4 * i as usize)?;
            chunk.push(PackedKey::new(x, y, top_start + i), color & 0xFF_FFFF);
        }

        if span.length == 0 {
            // Final record: its solid run reaches the map bottom. An all-air
            // column has top_start == depth and marks nothing.
            geometry.fill_column(x, y, top_start, depth);
            *offset = at + Span::SIZE + 4 * top_len as usize;
            return Ok(());
        }

        let words = span.length as u32;
        if words < top_len + 1 {
            return Err(DecodeError::SpanLength {
                offset: at,
                length: span.length,
                colors: top_len,
            });
        }
        let bottom_len = words - 1 - top_len;

        let next = Span::read(data, at + 4 * words as usize)?;
        let air_start = next.air_start as u32;
        if air_start > depth || air_start < top_start || air_start < bottom_len {
            return Err(DecodeError::SpanRange { offset: at });
        }
        let bottom_start = air_start - bottom_len;
        if bottom_len > 0 && bottom_start < top_start + top_len {
            return Err(DecodeError::SpanRange { offset: at });
        }

        for i in 0..bottom_len {
            let color = read_word(data, at + Span::SIZE + 4 * (top_len + i) as usize)?;
            chunk.push(PackedKey::new(x, y, bottom_start + i), color & 0xFF_FFFF);
        }

        geometry.fill_column(x, y, top_start, air_start);
        cursor = air_start;
        *offset = at + 4 * words as usize;
    }
}

/// Guesses the dimensions of an encoded map by scanning its spans: columns
/// are counted by their terminator records, and the depth is the smallest
/// power of two above the highest z seen in any record.
///
/// Assumes the map is square. The depth guess is approximate for maps whose
/// terrain never comes near the bottom.
pub fn guess_size(data: &[u8]) -> Result<(u32, u32), DecodeError> {
    let mut offset = 0;
    let mut columns: u64 = 0;
    let mut max_z: u32 = 0;

    while offset < data.len() {
        let span = Span::read(data, offset)?;
        let top_len = (span.color_end as u32 + 1).saturating_sub(span.color_start as u32);
        max_z = max_z
            .max(span.color_end as u32 + 1)
            .max(span.air_start as u32);
        if span.length == 0 {
            columns += 1;
            offset += Span::SIZE + 4 * top_len as usize;
        } else {
            offset += 4 * span.length as usize;
        }
        if offset > data.len() {
            return Err(DecodeError::Truncated {
                offset: data.len(),
                expected: offset - data.len(),
                actual: 0,
            });
        }
    }

    let size = (columns as f64).sqrt().round() as u32;
    let depth = max_z.max(1).next_power_of_two();

    Ok((size, depth))
}

fn column_color(column: &[Block], x: u32, y: u32, z: u32) -> u32 {
    match column.binary_search_by_key(&z, |b| b.key.z()) {
        Ok(i) => column[i].color,
        Err(_) => {
            warn!(x, y, z, "surface voxel has no stored color, using the default");
            DEFAULT_COLOR
        }
    }
}

/// Re-derives one column's records from the geometry and color store,
/// appending the encoded bytes to `out`.
///
/// A column is partitioned the way the reference encoder partitions it: skip
/// air, take the run of consecutive surface voxels as top colors, skip
/// interior voxels, then probe the following surface run. If that run touches
/// the map bottom there is no later record whose `air_start` could position
/// it, so it is left for the next iteration to emit as top colors; otherwise
/// it becomes this record's bottom colors.
pub(crate) fn encode_column(geometry: &Geometry, chunk: &Chunk, x: u32, y: u32, out: &mut Vec<u8>) {
    let depth = geometry.depth();
    let column = chunk.column_blocks(x, y);

    if (0..depth).all(|z| !geometry.is_solid(x, y, z)) {
        // All-air column: one terminator with an empty color run.
        out.extend_from_slice(&[0, depth as u8, (depth - 1) as u8, depth as u8]);
        return;
    }

    let mut z = 0;
    while z < depth {
        let air_start = z;
        while z < depth && !geometry.is_solid(x, y, z) {
            z += 1;
        }
        let top_start = z;
        while z < depth && geometry.on_surface(x, y, z) {
            z += 1;
        }
        let top_end = z;
        while z < depth && geometry.is_solid(x, y, z) && !geometry.on_surface(x, y, z) {
            z += 1;
        }
        let bottom_start = z;
        let mut probe = z;
        while probe < depth && geometry.on_surface(x, y, probe) {
            probe += 1;
        }
        let bottom_end = if probe == depth { bottom_start } else { probe };
        z = bottom_end;

        let top_len = top_end - top_start;
        let bottom_len = bottom_end - bottom_start;
        let length = if z == depth {
            0
        } else {
            (1 + top_len + bottom_len) as u8
        };

        out.push(length);
        out.push(top_start as u8);
        out.push((top_end - 1) as u8);
        out.push(air_start as u8);
        for zz in top_start..top_end {
            out.extend_from_slice(&column_color(column, x, y, zz).to_le_bytes());
        }
        for zz in bottom_start..bottom_end {
            out.extend_from_slice(&column_color(column, x, y, zz).to_le_bytes());
        }
    }
}

// ████████╗███████╗███████╗████████╗███████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝
//    ██║   █████╗  ███████╗   ██║   ███████╗
//    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║
//    ██║   ███████╗███████║   ██║   ███████║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝
