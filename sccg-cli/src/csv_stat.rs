use std::io;
use std::sync::Mutex;

#[derive(Debug)]
struct CsvStatOutputState {
    writer: csv::Writer<io::Stdout>,
    columns: Option<Vec<&'static str>>,
}

/// CSV statistics printed to the standard output, if enabled.
///
/// Rows are given as `(column, value)` pairs; the header is taken from the
/// first row and every later row has to use the same columns.
#[derive(Debug)]
pub(crate) struct CsvStatOutput {
    state: Option<Mutex<CsvStatOutputState>>,
}

impl CsvStatOutput {
    #[must_use]
    pub fn new(enabled: bool) -> Self {
        let state = enabled.then(|| {
            Mutex::new(CsvStatOutputState {
                writer: csv::Writer::from_writer(io::stdout()),
                columns: None,
            })
        });

        Self { state }
    }

    pub fn add_row(&self, row: &[(&'static str, String)]) -> anyhow::Result<()> {
        if let Some(state) = &self.state {
            let mut guard = state.lock().unwrap();
            let state = &mut *guard;
            let columns: Vec<&'static str> = row.iter().map(|(column, _)| *column).collect();

            if let Some(header) = &state.columns {
                if *header != columns {
                    anyhow::bail!("CSV row columns do not match the header: {:?}", columns);
                }
            } else {
                state.writer.write_record(&columns)?;
                state.columns = Some(columns);
            }
            state.writer.write_record(row.iter().map(|(_, value)| value))?;
        }

        anyhow::Ok(())
    }

    pub fn flush(&self) -> anyhow::Result<()> {
        if let Some(state) = &self.state {
            state.lock().unwrap().writer.flush()?;
        }

        anyhow::Ok(())
    }
}
