use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Defines the interface for reading and writing analysed result files.
///
/// Implementors are small value types carrying the decoding options (shape
/// mode, coordinate space) and handle one file layout each.
pub trait ObservableFile {
    /// The record produced by parsing one file.
    type Record;

    /// The error type for I/O and format failures.
    type Error: Error + From<io::Error>;

    /// Reads a record from a buffered reader.
    ///
    /// # Errors
    ///
    /// Returns an error if the content does not match the file layout or
    /// reading fails.
    fn read_from(&self, reader: &mut impl BufRead) -> Result<Self::Record, Self::Error>;

    /// Writes a record in the layout [`read_from`](Self::read_from) accepts.
    fn write_to(&self, record: &Self::Record, writer: &mut impl Write) -> Result<(), Self::Error>;

    fn read_from_path<P: AsRef<Path>>(&self, path: P) -> Result<Self::Record, Self::Error> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        self.read_from(&mut reader)
    }

    fn write_to_path<P: AsRef<Path>>(
        &self,
        record: &Self::Record,
        path: P,
    ) -> Result<(), Self::Error> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        self.write_to(record, &mut writer)?;
        writer.flush()?;
        Ok(())
    }
}
