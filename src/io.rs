use crate::map::VxlMap;
use crate::stream::VxlStream;

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Chunk size used when streaming a map to disk.
const WRITE_CHUNK_SIZE: usize = 64 * 1024;

/// Stream-encodes `map` into a new file at `path`, returning the total bytes
/// written.
pub fn write_to_file<P: AsRef<Path>>(map: &VxlMap, path: P) -> io::Result<u64> {
    let mut writer = BufWriter::new(File::create(path)?);
    let mut stream = VxlStream::new(map, WRITE_CHUNK_SIZE);
    let mut buffer = vec![0u8; WRITE_CHUNK_SIZE];
    let mut total = 0u64;

    loop {
        let n = stream.read(&mut buffer);
        if n == 0 {
            break;
        }
        writer.write_all(&buffer[..n])?;
        total += n as u64;
    }
    writer.flush()?;

    Ok(total)
}

// ████████╗███████╗███████╗████████╗███████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝
//    ██║   █████╗  ███████╗   ██║   ███████╗
//    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║
//    ██║   ███████╗███████║   ██║   ███████║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝
