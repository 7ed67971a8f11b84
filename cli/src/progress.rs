//! Terminal feedback for the CLI: a byte counter while an input file is read, a spinner
//! while the codec runs, and the one line summary logged when it is done.

use std::fmt;
use std::io::{self, Read};
use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

const DRAW_HZ: u8 = 8;

/// Wraps a reader and draws a bar on stderr until it is read to the end.
pub struct ProgressMonitor<R: Read> {
    reader: R,
    bar: ProgressBar,
}

impl<R: Read> ProgressMonitor<R> {
    pub fn new(reader: R, size: usize, label: &str) -> Self {
        let style =
            ProgressStyle::with_template("{msg} {wide_bar} {binary_bytes}/{binary_total_bytes}")
                .expect("progress template is valid");
        let bar = ProgressBar::with_draw_target(
            Some(size as u64),
            ProgressDrawTarget::stderr_with_hz(DRAW_HZ),
        )
        .with_style(style)
        .with_message(label.to_string());
        ProgressMonitor { reader, bar }
    }

    pub fn bytes_read(&self) -> u64 {
        self.bar.position()
    }
}

impl<R: Read> Read for ProgressMonitor<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.reader.read(buf)?;
        if n == 0 {
            self.bar.finish_and_clear();
        } else {
            self.bar.inc(n as u64);
        }
        Ok(n)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Operation {
    Compress,
    Decompress,
}

impl Operation {
    fn verb(self) -> &'static str {
        match self {
            Operation::Compress => "compressed",
            Operation::Decompress => "decompressed",
        }
    }
}

/// What one codec call did, logged after compress and decompress
#[derive(Debug, Clone, PartialEq)]
pub struct CodecReport {
    pub operation: Operation,
    /// Bytes handed to the codec
    pub input: usize,
    /// Bytes the codec produced
    pub output: usize,
    pub elapsed: Duration,
}

impl CodecReport {
    /// Container size as a percentage of the original size
    pub fn ratio(&self) -> f64 {
        match self.operation {
            Operation::Compress => ratio(self.output, self.input),
            Operation::Decompress => ratio(self.input, self.output),
        }
    }
}

impl fmt::Display for CodecReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} to {} ({:.1}% of original) in {}",
            self.operation.verb(),
            fmt_size(self.input as u64),
            fmt_size(self.output as u64),
            self.ratio(),
            fmt_duration(self.elapsed)
        )
    }
}

/// Run `codec` over `input` behind a spinner and report the sizes and time it took.
pub fn run_codec<E>(
    operation: Operation,
    input: &[u8],
    codec: impl FnOnce(&[u8]) -> Result<Vec<u8>, E>,
) -> Result<(Vec<u8>, CodecReport), E> {
    let spinner = ProgressBar::new_spinner().with_message(match operation {
        Operation::Compress => "compressing",
        Operation::Decompress => "decompressing",
    });
    spinner.enable_steady_tick(Duration::from_millis(100));

    let start = Instant::now();
    let result = codec(input);
    let elapsed = start.elapsed();
    spinner.finish_and_clear();

    let output = result?;
    let report = CodecReport {
        operation,
        input: input.len(),
        output: output.len(),
        elapsed,
    };
    Ok((output, report))
}

/// `part` as a percentage of `whole`
pub fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 100.0;
    }
    part as f64 * 100.0 / whole as f64
}

/// Binary units, two decimals above one KiB
pub fn fmt_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["KiB", "MiB", "GiB", "TiB", "PiB"];
    if bytes < 1024 {
        return format!("{bytes}B");
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.2}{}", UNITS[unit])
}

pub fn fmt_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    match secs {
        0 => format!("{:.2}ms", duration.as_secs_f64() * 1000.0),
        1..=59 => format!("{:.2}s", duration.as_secs_f64()),
        60..=3599 => format!("{}m {}s", secs / 60, secs % 60),
        _ => format!("{}h {}m", secs / 3600, secs % 3600 / 60),
    }
}
