use crc32fast::Hasher;

/// Generate a document seed from a name (page id, file path) using CRC32
pub fn get_document_id(name: &str) -> String {
    let mut buff = String::from(name);
    if !name.starts_with("page://") {
        buff = format!("page://{}", buff);
    }

    let mut hasher = Hasher::new();
    hasher.update(buff.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Sequential key generator for nodes within a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IDGenerator {
    seed: String, // Document ID (CRC32)
    count: u32,   // Sequential counter
}

impl IDGenerator {
    pub fn new(name: &str) -> Self {
        Self {
            seed: get_document_id(name),
            count: 0,
        }
    }

    pub fn from_seed(seed: String) -> Self {
        Self { seed, count: 0 }
    }

    /// Generate next sequential ID
    pub fn new_id(&mut self) -> String {
        self.count += 1;
        format!("{}-{}", self.seed, self.count)
    }

    /// Generate the next ID not rejected by `taken`
    pub fn new_unique_id(&mut self, taken: impl Fn(&str) -> bool) -> String {
        loop {
            let id = self.new_id();
            if !taken(&id) {
                return id;
            }
        }
    }

    /// Get document ID seed
    pub fn seed(&self) -> &str {
        &self.seed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_id_generation() {
        let id1 = get_document_id("landing-42");
        let id2 = get_document_id("landing-42");

        // Same name always generates same ID
        assert_eq!(id1, id2);

        // Different names generate different IDs
        let id3 = get_document_id("landing-43");
        assert_ne!(id1, id3);
    }

    #[test]
    fn test_sequential_ids() {
        let mut gen = IDGenerator::new("landing-42");

        let id1 = gen.new_id();
        let id2 = gen.new_id();

        assert!(id1.ends_with("-1"));
        assert!(id2.ends_with("-2"));
        assert!(id1.starts_with(gen.seed()));
    }

    #[test]
    fn test_unique_ids_skip_taken() {
        let mut gen = IDGenerator::from_seed("abc".to_string());
        let id = gen.new_unique_id(|candidate| candidate == "abc-1" || candidate == "abc-2");
        assert_eq!(id, "abc-3");
    }
}
