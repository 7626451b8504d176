//! Output sink management: the dump directory, and the single-file vs.
//! one-file-per-batch lifecycles.

use crate::config::ExportOptions;
use crate::ntriples::NtWriter;
use std::fs;
use std::io;
use std::path::PathBuf;

/// Decides which file a batch writes into and owns the open writer.
///
/// Single-file mode keeps one `<prefix>.nt` writer open for the whole run.
/// Split mode opens a fresh `<prefix><offset>.nt` per batch and closes it
/// before the next batch starts; no two batches ever share a file.
pub struct SinkManager {
    root: PathBuf,
    prefix: String,
    split: bool,
    buf_bytes: usize,
    current: Option<NtWriter>,
}

impl SinkManager {
    /// Create the output root (idempotent) and an empty manager.
    /// Root creation failure is fatal for the job.
    pub fn create(opts: &ExportOptions) -> io::Result<Self> {
        fs::create_dir_all(&opts.output_dir)?;
        Ok(Self {
            root: opts.output_dir.clone(),
            prefix: opts.file_prefix.clone(),
            split: opts.split_files,
            buf_bytes: opts.write_buffer_bytes,
            current: None,
        })
    }

    pub fn single_path(&self) -> PathBuf {
        self.root.join(format!("{}.nt", self.prefix))
    }

    pub fn split_path(&self, offset: u64) -> PathBuf {
        self.root.join(format!("{}{}.nt", self.prefix, offset))
    }

    /// Open the persistent single-file writer. Called once, as soon as the
    /// total count is known; a failure here is fatal.
    pub fn open_single(&mut self) -> io::Result<&mut NtWriter> {
        if self.current.is_none() {
            let w = NtWriter::create(&self.single_path(), self.buf_bytes)?;
            self.current = Some(w);
        }
        Ok(self.current.as_mut().expect("single sink opened above"))
    }

    /// Writer for the batch starting at `offset`. In split mode this opens a
    /// new per-offset file (so a batch that fails after this point still
    /// leaves its file behind); in single mode it reuses the persistent one.
    pub fn sink_for(&mut self, offset: u64) -> io::Result<&mut NtWriter> {
        if self.split {
            let w = NtWriter::create(&self.split_path(offset), self.buf_bytes)?;
            Ok(self.current.insert(w))
        } else {
            self.open_single()
        }
    }

    /// Close out the current batch. Only split mode closes here; the single
    /// file stays open until [`SinkManager::finish`].
    pub fn end_batch(&mut self) -> io::Result<()> {
        if self.split {
            if let Some(w) = self.current.take() {
                w.finish()?;
            }
        }
        Ok(())
    }

    /// Flush and close whatever is still open at job end.
    pub fn finish(&mut self) -> io::Result<()> {
        if let Some(w) = self.current.take() {
            w.finish()?;
        }
        Ok(())
    }
}
