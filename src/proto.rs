//! Generated protobuf types for `road.echo.v1` plus conversions between the
//! wire `Metadata` message and tonic's `MetadataMap`.

use tonic::metadata::{KeyRef, MetadataMap};

tonic::include_proto!("road.echo.v1");

/// Encoded file descriptor set, served by the reflection service
pub const FILE_DESCRIPTOR_SET: &[u8] = tonic::include_file_descriptor_set!("echo_descriptor");

impl Metadata {
    /// Iterates over `(key, values)` pairs in the order they were recorded
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.items
            .iter()
            .map(|item| (item.key.as_str(), item.values.as_slice()))
    }

    /// Returns the values recorded for `key`, if any
    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.items
            .iter()
            .find(|item| item.key == key)
            .map(|item| item.values.as_slice())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Snapshot of the metadata attached to an inbound call.
    ///
    /// Each key appears once, in first-seen order, with every value in the
    /// order the transport delivered it. Binary (`-bin`) values are decoded
    /// from base64 and rendered lossily as UTF-8.
    pub fn from_metadata_map(map: &MetadataMap) -> Self {
        let items = map
            .keys()
            .map(|key| match key {
                KeyRef::Ascii(key) => MetadataItem {
                    key: key.as_str().to_string(),
                    values: map
                        .get_all(key)
                        .iter()
                        .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
                        .collect(),
                },
                KeyRef::Binary(key) => MetadataItem {
                    key: key.as_str().to_string(),
                    values: map
                        .get_all_bin(key)
                        .iter()
                        .map(|value| match value.to_bytes() {
                            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
                            Err(_) => String::from_utf8_lossy(value.as_encoded_bytes()).into_owned(),
                        })
                        .collect(),
                },
            })
            .collect();

        Metadata { items }
    }
}

impl<'a> IntoIterator for &'a Metadata {
    type Item = (&'a str, &'a [String]);
    type IntoIter = Box<dyn Iterator<Item = Self::Item> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

impl<K, V> FromIterator<(K, V)> for Metadata
where
    K: Into<String>,
    V: IntoIterator,
    V::Item: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Metadata {
            items: iter
                .into_iter()
                .map(|(key, values)| MetadataItem {
                    key: key.into(),
                    values: values.into_iter().map(Into::into).collect(),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tonic::metadata::{MetadataValue, BinaryMetadataValue};

    #[test]
    fn test_from_metadata_map_keeps_value_order() {
        let mut map = MetadataMap::new();
        map.append("x-trace", MetadataValue::from_static("first"));
        map.insert("x-user", MetadataValue::from_static("alice"));
        map.append("x-trace", MetadataValue::from_static("second"));

        let metadata = Metadata::from_metadata_map(&map);

        assert_eq!(metadata.len(), 2);
        assert_eq!(
            metadata.get("x-trace"),
            Some(&["first".to_string(), "second".to_string()][..])
        );
        assert_eq!(metadata.get("x-user"), Some(&["alice".to_string()][..]));
    }

    #[test]
    fn test_from_metadata_map_decodes_binary_values() {
        let mut map = MetadataMap::new();
        map.insert_bin("x-blob-bin", BinaryMetadataValue::from_bytes(b"raw bytes"));

        let metadata = Metadata::from_metadata_map(&map);

        assert_eq!(metadata.get("x-blob-bin"), Some(&["raw bytes".to_string()][..]));
    }

    #[test]
    fn test_empty_map_yields_empty_metadata() {
        let metadata = Metadata::from_metadata_map(&MetadataMap::new());
        assert!(metadata.is_empty());
        assert_eq!(metadata.iter().count(), 0);
    }

    #[test]
    fn test_collect_from_pairs() {
        let metadata: Metadata = vec![("a", vec!["1", "2"]), ("b", vec![])]
            .into_iter()
            .collect();

        let keys: Vec<&str> = metadata.iter().map(|(key, _)| key).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(metadata.get("b"), Some(&[][..]));
        assert_eq!(metadata.get("missing"), None);
    }
}
