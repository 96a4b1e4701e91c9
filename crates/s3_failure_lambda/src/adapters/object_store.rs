pub trait ObjectStore {
    fn copy_object(
        &self,
        bucket: &str,
        source_key: &str,
        destination_key: &str,
    ) -> Result<(), String>;

    fn delete_object(&self, bucket: &str, key: &str) -> Result<(), String>;
}
