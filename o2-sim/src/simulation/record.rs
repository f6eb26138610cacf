use std::io::{self, Write};

use serde::{Deserialize, Serialize};

use crate::geometry::Coords;
use crate::mcmc::UpdateFamily;
use crate::observables::Observables;
use crate::spins::Spin;

/// Values handed to a [`Recorder`] at every reporting interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Completed sweeps (full-sweep mode) or step index (interleaved mode).
    pub step: u64,
    /// Site of the last update before the measurement.
    pub site: Coords,
    pub spin_before: Spin,
    pub spin_after: Spin,
    pub magnetization: Spin,
    pub energy_per_site: f64,
    pub family: UpdateFamily,
}

impl Record {
    pub fn observables(&self) -> Observables {
        Observables {
            magnetization: self.magnetization,
            energy_per_site: self.energy_per_site,
        }
    }
}

/// Sink for per-interval records. Serialization format is up to the
/// implementation.
pub trait Recorder {
    /// Called once before the first record.
    fn begin(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn record(&mut self, record: &Record) -> io::Result<()>;

    /// Called once after the last record.
    fn finish(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Recorder for Vec<Record> {
    fn record(&mut self, record: &Record) -> io::Result<()> {
        self.push(*record);
        Ok(())
    }
}

impl<R: Recorder + ?Sized> Recorder for &mut R {
    fn begin(&mut self) -> io::Result<()> {
        (**self).begin()
    }

    fn record(&mut self, record: &Record) -> io::Result<()> {
        (**self).record(record)
    }

    fn finish(&mut self) -> io::Result<()> {
        (**self).finish()
    }
}

/// Column set of a [`TextRecorder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextLayout {
    /// `mx my E`
    Compact,
    /// `step i j k sx_old sy_old sx_new sy_new mx my E family`
    Complete,
}

impl TextLayout {
    fn header(self) -> &'static str {
        match self {
            Self::Compact => "# mx my Energy_per_site",
            Self::Complete => "# step i j k sx_old sy_old sx_new sy_new mx my Energy_per_site family",
        }
    }
}

/// Human-readable records: a `#` header line, then one space-separated line
/// per record with 15 decimal digits.
pub struct TextRecorder<W: Write> {
    out: W,
    layout: TextLayout,
}

impl<W: Write> TextRecorder<W> {
    pub fn new(out: W, layout: TextLayout) -> Self {
        Self { out, layout }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Recorder for TextRecorder<W> {
    fn begin(&mut self) -> io::Result<()> {
        writeln!(self.out, "{}", self.layout.header())
    }

    fn record(&mut self, r: &Record) -> io::Result<()> {
        let m = r.magnetization;
        match self.layout {
            TextLayout::Compact => writeln!(
                self.out,
                "{:.15} {:.15} {:.15}",
                m.sx, m.sy, r.energy_per_site
            ),
            TextLayout::Complete => {
                let [i, j, k] = r.site;
                writeln!(
                    self.out,
                    "{} {} {} {} {:.15} {:.15} {:.15} {:.15} {:.15} {:.15} {:.15} {}",
                    r.step,
                    i,
                    j,
                    k,
                    r.spin_before.sx,
                    r.spin_before.sy,
                    r.spin_after.sx,
                    r.spin_after.sy,
                    m.sx,
                    m.sy,
                    r.energy_per_site,
                    r.family
                )
            }
        }
    }

    fn finish(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

/// Size in bytes of one binary record.
pub const BINARY_RECORD_LEN: usize = 3 * std::mem::size_of::<f64>();

/// Packed records: `mx`, `my`, `E` as native-endian `f64`, no separators.
pub struct BinaryRecorder<W: Write> {
    out: W,
}

impl<W: Write> BinaryRecorder<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Recorder for BinaryRecorder<W> {
    fn record(&mut self, r: &Record) -> io::Result<()> {
        let mut buf = [0u8; BINARY_RECORD_LEN];
        let fields = [r.magnetization.sx, r.magnetization.sy, r.energy_per_site];
        for (chunk, v) in buf.chunks_exact_mut(8).zip(fields) {
            chunk.copy_from_slice(&v.to_ne_bytes());
        }
        self.out.write_all(&buf)
    }

    fn finish(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

/// Decode a stream written by [`BinaryRecorder`] into `[mx, my, E]` triples.
/// Trailing bytes that do not fill a whole record are ignored.
pub fn decode_binary(bytes: &[u8]) -> Vec<[f64; 3]> {
    bytes
        .chunks_exact(BINARY_RECORD_LEN)
        .map(|rec| {
            let mut out = [0.0; 3];
            for (v, chunk) in out.iter_mut().zip(rec.chunks_exact(8)) {
                let mut raw = [0u8; 8];
                raw.copy_from_slice(chunk);
                *v = f64::from_ne_bytes(raw);
            }
            out
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Record {
        Record {
            step: 12,
            site: [1, 0, 3],
            spin_before: Spin::new(1.0, 0.0),
            spin_after: Spin::new(0.0, -1.0),
            magnetization: Spin::new(0.25, -0.5),
            energy_per_site: -1.75,
            family: UpdateFamily::Microcanonical,
        }
    }

    #[test]
    fn test_text_compact() {
        let mut rec = TextRecorder::new(Vec::new(), TextLayout::Compact);
        rec.begin().unwrap();
        rec.record(&sample()).unwrap();
        rec.finish().unwrap();
        let text = String::from_utf8(rec.into_inner()).unwrap();
        assert_eq!(
            text,
            "# mx my Energy_per_site\n0.250000000000000 -0.500000000000000 -1.750000000000000\n"
        );
    }

    #[test]
    fn test_text_complete() {
        let mut rec = TextRecorder::new(Vec::new(), TextLayout::Complete);
        rec.begin().unwrap();
        rec.record(&sample()).unwrap();
        let text = String::from_utf8(rec.into_inner()).unwrap();
        let mut lines = text.lines();
        let header: Vec<&str> = lines.next().unwrap().split(' ').skip(1).collect();
        let fields: Vec<&str> = lines.next().unwrap().split(' ').collect();
        assert_eq!(fields.len(), 12);
        assert_eq!(header.len(), fields.len());
        assert_eq!(header[0], "step");
        assert_eq!(header[11], "family");
        assert_eq!(&fields[..4], &["12", "1", "0", "3"]);
        assert_eq!(fields[11], "microcanonical");
        assert_eq!(fields[10].parse::<f64>().unwrap(), -1.75);
    }

    #[test]
    fn test_binary_layout() {
        let mut rec = BinaryRecorder::new(Vec::new());
        rec.begin().unwrap();
        rec.record(&sample()).unwrap();
        rec.record(&sample()).unwrap();
        let bytes = rec.into_inner();
        assert_eq!(bytes.len(), 2 * BINARY_RECORD_LEN);
        assert_eq!(decode_binary(&bytes), vec![[0.25, -0.5, -1.75]; 2]);
    }

    #[test]
    fn test_vec_recorder() {
        let mut records: Vec<Record> = Vec::new();
        records.record(&sample()).unwrap();
        assert_eq!(records, vec![sample()]);
        assert_eq!(records[0].observables().energy_per_site, -1.75);
    }
}
