use serde::{de::DeserializeOwned, Serialize};

/// A value that is always read and written whole, under a single storage
/// key. There are no partial updates; callers load, modify and save back.
pub trait Document: Serialize + DeserializeOwned {
    const KEY: &'static str;
}

#[cfg(test)]
mod test {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Serialize, Deserialize)]
    struct Shelf {
        jars: Vec<String>,
    }

    impl Document for Shelf {
        const KEY: &'static str = "shelf";
    }

    fn key_of<D: Document>() -> &'static str {
        D::KEY
    }

    #[test]
    fn key_is_associated_with_the_type() {
        assert_eq!(key_of::<Shelf>(), "shelf");
    }
}
