use {
    crate::types::*,
    std::{
        fs::File,
        io::{BufWriter, Write},
        path::PathBuf,
    },
};

/// Streaming DRAT writer.
///
/// Records are emitted in the outer numbering at the moment the matching
/// database mutation happens; a failing write silently disables the store
/// so a full disk never aborts the solving run.
#[derive(Debug, Default)]
pub struct CertificationStore {
    target: Option<PathBuf>,
    buffer: Option<BufWriter<File>>,
}

impl Clone for CertificationStore {
    fn clone(&self) -> Self {
        Self::default()
    }
}

impl Instantiate for CertificationStore {
    fn instantiate(config: &Config, _cnf: &CNFDescription) -> Self {
        if config.use_certification {
            let cert: PathBuf = config.output_dir.join(&config.proof_file);
            if let Ok(out) = File::create(&cert) {
                return CertificationStore {
                    buffer: Some(BufWriter::new(out)),
                    target: Some(cert),
                };
            }
        }
        CertificationStore::default()
    }
}

impl CertificationStore {
    pub fn is_active(&self) -> bool {
        self.buffer.is_some()
    }
    /// record a derived clause.
    pub fn push_add(&mut self, vec: &[i32]) {
        if let Some(ref mut buf) = self.buffer {
            for l in vec {
                if buf.write_all(format!("{l} ").as_bytes()).is_err() {
                    self.buffer = None;
                    return;
                }
            }
            if buf.write_all(b"0\n").is_err() {
                self.buffer = None;
            }
        }
    }
    /// record a level-0 unit.
    pub fn push_assertion(&mut self, l: i32) {
        self.push_add(&[l]);
    }
    /// record a clause deletion.
    pub fn push_delete(&mut self, vec: &[i32]) {
        if let Some(ref mut buf) = self.buffer {
            if buf.write_all(b"d ").is_err() {
                self.buffer = None;
                return;
            }
            for l in vec {
                if buf.write_all(format!("{l} ").as_bytes()).is_err() {
                    self.buffer = None;
                    return;
                }
            }
            if buf.write_all(b"0\n").is_err() {
                self.buffer = None;
            }
        }
    }
    /// record the empty clause and stop writing.
    pub fn push_empty_clause(&mut self) {
        if let Some(ref mut buf) = self.buffer {
            let _ = buf.write_all(b"0\n");
            let _ = buf.flush();
            self.buffer = None;
            self.target = None;
        }
    }
    pub fn close(&mut self) {
        if let Some(ref mut buf) = self.buffer {
            let _ = buf.flush();
            self.buffer = None;
            self.target = None;
        }
    }
}
