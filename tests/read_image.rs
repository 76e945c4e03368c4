use fat12::filesys::fat12::image::ImageBuilder;
use fat12::{
    short_name, BlockDevice, DirEntry83, Fat12, FsError, Geometry, ImageBlockDevice,
    MemoryBlockDevice, OpenStage,
};
use std::fs;
use std::path::PathBuf;

struct TempImage(PathBuf);

impl TempImage {
    fn new(tag: &str, bytes: &[u8]) -> Self {
        let path = std::env::temp_dir().join(format!("fat12-{}-{}.img", tag, std::process::id()));
        fs::write(&path, bytes).unwrap();
        TempImage(path)
    }
}

impl Drop for TempImage {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.0);
    }
}

fn floppy_with_files() -> ImageBuilder {
    let mut builder = ImageBuilder::new(Geometry::default());
    builder.add_file(*b"README  TXT", b"FAT12 keeps two entries in three bytes.\n");
    let kernel: Vec<u8> = (0..3000u32).map(|i| (i ^ (i >> 3)) as u8).collect();
    builder.add_file(*b"KERNEL  BIN", &kernel);
    builder
}

#[test]
fn reads_files_from_image_file() {
    let image = TempImage::new("files", &floppy_with_files().build());
    let device = ImageBlockDevice::open(&image.0).unwrap();
    let fs = Fat12::open(Box::new(device)).unwrap();

    let readme = fs.read_file(&short_name("README.TXT").unwrap()).unwrap();
    assert_eq!(readme, b"FAT12 keeps two entries in three bytes.\n");

    let kernel = fs.read_file(b"KERNEL  BIN").unwrap();
    assert_eq!(kernel.len(), 3000);
    assert_eq!(kernel[2999], (2999u32 ^ (2999 >> 3)) as u8);

    let names: Vec<String> = fs
        .entries()
        .map(|e| e.display_name().as_str().to_string())
        .collect();
    assert_eq!(names, ["README.TXT", "KERNEL.BIN"]);
}

#[test]
fn floppy_chain_maps_to_expected_sectors() {
    let mut builder = ImageBuilder::new(Geometry::default());
    builder.set_entry(2, 3).set_entry(3, 0xFFF);
    builder.add_entry(DirEntry83::new_file(*b"TWO     BIN", 2, 1024));
    let fs = Fat12::open(Box::new(MemoryBlockDevice::from_bytes(builder.build()))).unwrap();

    assert_eq!(fs.root_directory().start_lba(), 19);
    assert_eq!(fs.root_directory().end_lba(), 33);

    let reader = fs.reader();
    let sectors: Vec<u64> = fs
        .fat()
        .chain(2)
        .map(|cluster| reader.cluster_to_sector(cluster.unwrap()))
        .collect();
    assert_eq!(sectors, [33u64, 34]);
}

#[test]
fn output_is_whole_clusters_until_consumed() {
    let geometry = Geometry {
        sectors_per_cluster: 4,
        ..Geometry::default()
    };
    let mut builder = ImageBuilder::new(geometry);
    builder.add_file(*b"ODD     DAT", &[0x42; 2049]);
    let fs = Fat12::open(Box::new(MemoryBlockDevice::from_bytes(builder.build()))).unwrap();

    let entry = fs.find(b"ODD     DAT").unwrap();
    let raw = fs.read_entry(&entry).unwrap();
    assert_eq!(raw.len() % fs.geometry().cluster_size(), 0);
    assert_eq!(raw.len(), 2 * 2048);
    assert_eq!(fs.read_file(b"ODD     DAT").unwrap().len(), 2049);
}

#[test]
fn bad_cluster_stops_the_read() {
    let mut builder = ImageBuilder::new(Geometry::default());
    builder
        .write_cluster(2, b"first")
        .write_cluster(3, b"second")
        .set_entry(2, 3)
        .set_entry(3, 0xFF7);
    builder.add_entry(DirEntry83::new_file(*b"BAD     BIN", 2, 1500));
    let fs = Fat12::open(Box::new(MemoryBlockDevice::from_bytes(builder.build()))).unwrap();

    let entry = fs.find(b"BAD     BIN").unwrap();
    let mut out = Vec::new();
    assert_eq!(
        fs.reader().read_into(&entry, &mut out),
        Err(FsError::BadCluster(3))
    );
    assert_eq!(out.len(), 1024);
    assert_eq!(&out[..5], b"first");
    assert_eq!(&out[512..518], b"second");
    assert_eq!(fs.read_file(b"BAD     BIN"), Err(FsError::BadCluster(3)));
}

#[test]
fn truncated_image_fails_at_root_directory() {
    let bytes = floppy_with_files().build();
    let image = TempImage::new("truncated", &bytes[..25 * 512]);
    let device = ImageBlockDevice::open(&image.0).unwrap();
    assert_eq!(device.total_blocks(), 25);

    let err = Fat12::open(Box::new(device)).err().unwrap();
    assert_eq!(err.stage, OpenStage::RootDirectory);
    assert_eq!(err.error, FsError::IOError);
}
