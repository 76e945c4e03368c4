//! Reads file contents by following the cluster chain

use super::{
    dir_entry::DirEntry83,
    fat_table::{Chain, FatTable},
    Geometry,
};
use crate::filesys::{BlockDevice, FsError};

/// Maps clusters to sectors and reads them, one whole cluster at a time
pub struct FileReader<'a> {
    device: &'a dyn BlockDevice,
    fat: &'a FatTable,
    geometry: &'a Geometry,
    /// First sector of cluster 2
    data_lba: u64,
}

impl<'a> FileReader<'a> {
    /// `data_lba` is the end of the root directory, where cluster 2 starts
    pub fn new(
        device: &'a dyn BlockDevice,
        fat: &'a FatTable,
        geometry: &'a Geometry,
        data_lba: u64,
    ) -> Self {
        Self {
            device,
            fat,
            geometry,
            data_lba,
        }
    }

    /// Converts cluster number to absolute sector number
    pub fn cluster_to_sector(&self, cluster: u16) -> u64 {
        self.data_lba + (cluster as u64 - 2) * self.geometry.sectors_per_cluster as u64
    }

    /// Lazily yields the file's clusters in chain order
    pub fn clusters(&self, entry: &DirEntry83) -> ClusterReader<'a> {
        ClusterReader {
            device: self.device,
            sectors_per_cluster: self.geometry.sectors_per_cluster as usize,
            data_lba: self.data_lba,
            chain: self.fat.chain(entry.first_cluster()),
            empty: is_empty_file(entry),
        }
    }

    /// Appends every cluster of the file to `out`.
    ///
    /// The last cluster is appended whole, so `out` grows by a multiple of
    /// the cluster size. On error `out` keeps the clusters read before it.
    pub fn read_into(&self, entry: &DirEntry83, out: &mut Vec<u8>) -> Result<(), FsError> {
        if is_empty_file(entry) {
            return Ok(());
        }

        let sectors = self.geometry.sectors_per_cluster as usize;
        for cluster in self.fat.chain(entry.first_cluster()) {
            let cluster = cluster?;
            self.device
                .append_sectors(self.cluster_to_sector(cluster), sectors, out)?;
        }
        Ok(())
    }

    /// Reads the whole chain into a new buffer at least `entry.size` long.
    /// The caller truncates to `entry.size`.
    pub fn read(&self, entry: &DirEntry83) -> Result<Vec<u8>, FsError> {
        let cluster_size = self.geometry.cluster_size().max(1);
        let mut out = Vec::with_capacity((entry.size as usize).div_ceil(cluster_size) * cluster_size);
        self.read_into(entry, &mut out)?;
        Ok(out)
    }
}

// Zero-length files own no cluster.
fn is_empty_file(entry: &DirEntry83) -> bool {
    entry.size == 0 && entry.first_cluster() == 0
}

/// Single-pass iterator over the clusters of one file, each read on demand
pub struct ClusterReader<'a> {
    device: &'a dyn BlockDevice,
    sectors_per_cluster: usize,
    data_lba: u64,
    chain: Chain<'a>,
    empty: bool,
}

impl Iterator for ClusterReader<'_> {
    type Item = Result<Vec<u8>, FsError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.empty {
            return None;
        }
        let result = self.chain.next()?.and_then(|cluster| {
            let lba = self.data_lba + (cluster as u64 - 2) * self.sectors_per_cluster as u64;
            self.device.read_sectors(lba, self.sectors_per_cluster)
        });
        if result.is_err() {
            self.empty = true;
        }
        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filesys::block::MemoryBlockDevice;
    use crate::filesys::fat12::image::ImageBuilder;

    struct Fixture {
        device: MemoryBlockDevice,
        fat: FatTable,
        geometry: Geometry,
    }

    impl Fixture {
        fn new(builder: &ImageBuilder) -> Self {
            let geometry = *builder.geometry();
            let device = MemoryBlockDevice::from_bytes(builder.build());
            let fat = FatTable::load(&device, &geometry).unwrap();
            Self {
                device,
                fat,
                geometry,
            }
        }

        fn reader(&self) -> FileReader<'_> {
            FileReader::new(&self.device, &self.fat, &self.geometry, self.geometry.data_lba())
        }
    }

    fn pattern(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i % 251) as u8).collect()
    }

    #[test]
    fn test_floppy_cluster_mapping() {
        let builder = ImageBuilder::new(Geometry::default());
        let fixture = Fixture::new(&builder);
        let reader = fixture.reader();
        assert_eq!(reader.cluster_to_sector(2), 33);
        assert_eq!(reader.cluster_to_sector(3), 34);
    }

    #[test]
    fn test_read_whole_clusters() {
        let mut builder = ImageBuilder::new(Geometry::default());
        let contents = pattern(1300);
        builder.add_file(*b"DATA    BIN", &contents);
        let fixture = Fixture::new(&builder);
        let entry = DirEntry83::new_file(*b"DATA    BIN", 2, 1300);

        let out = fixture.reader().read(&entry).unwrap();
        assert_eq!(out.len(), 3 * 512);
        assert_eq!(&out[..1300], &contents[..]);
        assert!(out[1300..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_read_follows_chain_order() {
        let geometry = Geometry {
            sectors_per_cluster: 2,
            ..Geometry::default()
        };
        let mut builder = ImageBuilder::new(geometry);
        builder
            .write_cluster(7, &[0xAA; 1024])
            .write_cluster(3, &[0xBB; 1024])
            .set_entry(7, 3)
            .set_entry(3, 0xFF8);
        let fixture = Fixture::new(&builder);
        let entry = DirEntry83::new_file(*b"SCATTER    ", 7, 1500);

        let out = fixture.reader().read(&entry).unwrap();
        assert_eq!(out.len(), 2048);
        assert!(out[..1024].iter().all(|&b| b == 0xAA));
        assert!(out[1024..].iter().all(|&b| b == 0xBB));
    }

    #[test]
    fn test_bad_cluster_keeps_partial_output() {
        let mut builder = ImageBuilder::new(Geometry::default());
        builder
            .write_cluster(2, &[1; 512])
            .write_cluster(3, &[2; 512])
            .set_entry(2, 3)
            .set_entry(3, 0xFF7);
        let fixture = Fixture::new(&builder);
        let entry = DirEntry83::new_file(*b"BROKEN     ", 2, 2000);

        let mut out = Vec::new();
        let result = fixture.reader().read_into(&entry, &mut out);
        assert_eq!(result, Err(FsError::BadCluster(3)));
        assert_eq!(out.len(), 1024);
        assert!(out[..512].iter().all(|&b| b == 1));
        assert!(out[512..].iter().all(|&b| b == 2));
    }

    #[test]
    fn test_bad_first_cluster_reads_one_cluster() {
        let mut builder = ImageBuilder::new(Geometry::default());
        builder.write_cluster(2, &[7; 512]).set_entry(2, 0xFF7);
        let fixture = Fixture::new(&builder);
        let entry = DirEntry83::new_file(*b"BADSTARTBIN", 2, 100);

        let mut out = vec![0xEE];
        let result = fixture.reader().read_into(&entry, &mut out);
        assert_eq!(result, Err(FsError::BadCluster(2)));
        assert_eq!(out.len(), 1 + 512);
        assert!(out[1..].iter().all(|&b| b == 7));
    }

    #[test]
    fn test_read_past_image_end() {
        let geometry = Geometry {
            total_sectors: 40,
            ..Geometry::default()
        };
        let mut builder = ImageBuilder::new(geometry);
        builder.set_entry(2, 100).set_entry(100, 0xFFF);
        let fixture = Fixture::new(&builder);
        let entry = DirEntry83::new_file(*b"OUTSIDE    ", 2, 1024);

        let mut out = Vec::new();
        let result = fixture.reader().read_into(&entry, &mut out);
        assert_eq!(result, Err(FsError::IOError));
        assert_eq!(out.len(), 512);
    }

    #[test]
    fn test_empty_file() {
        let mut builder = ImageBuilder::new(Geometry::default());
        builder.add_file(*b"EMPTY      ", &[]);
        let fixture = Fixture::new(&builder);
        let entry = DirEntry83::new_file(*b"EMPTY      ", 0, 0);

        assert_eq!(fixture.reader().read(&entry).unwrap(), Vec::<u8>::new());
        assert_eq!(fixture.reader().clusters(&entry).count(), 0);
    }

    #[test]
    fn test_cluster_reader_is_lazy() {
        let mut builder = ImageBuilder::new(Geometry::default());
        builder
            .write_cluster(2, &[5; 512])
            .write_cluster(3, &[6; 512])
            .set_entry(2, 3)
            .set_entry(3, 0xFF7);
        let fixture = Fixture::new(&builder);
        let entry = DirEntry83::new_file(*b"CHUNKS     ", 2, 1024);
        let reader = fixture.reader();
        let mut clusters = reader.clusters(&entry);

        assert_eq!(clusters.next().unwrap().unwrap(), vec![5; 512]);
        assert_eq!(clusters.next().unwrap().unwrap(), vec![6; 512]);
        assert_eq!(clusters.next().unwrap(), Err(FsError::BadCluster(3)));
        assert!(clusters.next().is_none());
    }
}
