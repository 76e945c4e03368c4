use std::env;
use std::io::{self, Write};
use std::process;

use fat12::constants::exit_codes;
use fat12::{logging, short_name, Fat12, ImageBlockDevice, OpenOptions, OpenStage};
use log::LevelFilter;

struct Args {
    image: String,
    file: Option<String>,
    list: bool,
    level: LevelFilter,
    options: OpenOptions,
}

fn usage(program: &str) -> String {
    format!(
        "Usage: {} [-v|-vv|-q] [-l] [--strict] [--skip-free] <disk image> <file name>",
        program
    )
}

fn parse_args(mut argv: impl Iterator<Item = String>) -> Option<Args> {
    let mut positional = Vec::new();
    let mut args = Args {
        image: String::new(),
        file: None,
        list: false,
        level: logging::default_level(),
        options: OpenOptions::default(),
    };

    for arg in argv.by_ref() {
        match arg.as_str() {
            "-v" => args.level = LevelFilter::Debug,
            "-vv" => args.level = LevelFilter::Trace,
            "-q" => args.level = LevelFilter::Warn,
            "-l" => args.list = true,
            "--strict" => args.options.strict = true,
            "--skip-free" => args.options.skip_free_entries = true,
            _ => positional.push(arg),
        }
    }

    let mut positional = positional.into_iter();
    args.image = positional.next()?;
    args.file = positional.next();
    if args.file.is_none() && !args.list {
        return None;
    }
    Some(args)
}

/// Printable bytes verbatim, newlines as-is, anything else as `<xx>`
fn write_contents(out: &mut impl Write, contents: &[u8]) -> io::Result<()> {
    for &b in contents {
        if b == b'\n' || b == b' ' || b.is_ascii_graphic() {
            out.write_all(&[b])?;
        } else {
            write!(out, "<{:02x}>", b)?;
        }
    }
    writeln!(out)
}

fn list(fs: &Fat12, out: &mut impl Write) -> io::Result<()> {
    for entry in fs.entries() {
        writeln!(
            out,
            "{:<12} {} {:>5} {:>10}",
            entry.display_name().as_str(),
            entry.attribute_flags().as_str(),
            entry.first_cluster(),
            entry.size
        )?;
    }
    Ok(())
}

fn run(args: Args) -> Result<(), i32> {
    let device = ImageBlockDevice::open(&args.image).map_err(|_| {
        eprintln!("Could not open disk image \"{}\"!", args.image);
        exit_codes::IMAGE_OPEN_FAILED
    })?;

    let fs = Fat12::open_with(Box::new(device), args.options).map_err(|err| {
        log::warn!("{}", err);
        match err.stage {
            OpenStage::BootSector => {
                eprintln!("Could not read boot sector!");
                exit_codes::BOOT_SECTOR_FAILED
            }
            OpenStage::Fat => {
                eprintln!("Could not read FAT!");
                exit_codes::FAT_LOAD_FAILED
            }
            OpenStage::RootDirectory => {
                eprintln!("Could not read root directory!");
                exit_codes::ROOT_DIR_LOAD_FAILED
            }
        }
    })?;

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if args.list {
        if let Err(e) = list(&fs, &mut out) {
            log::warn!("writing listing: {}", e);
        }
        if args.file.is_none() {
            return Ok(());
        }
    }

    let name = args.file.unwrap_or_default();
    let entry = short_name(&name)
        .and_then(|key| fs.find(&key))
        .ok_or_else(|| {
            eprintln!("Could not find file \"{}\"!", name);
            exit_codes::FILE_NOT_FOUND
        })?;

    let mut contents = fs.read_entry(&entry).map_err(|err| {
        log::warn!("reading {}: {}", name, err);
        eprintln!("Could not read file \"{}\"!", name);
        exit_codes::FILE_READ_FAILED
    })?;
    contents.truncate(entry.size as usize);

    if let Err(e) = write_contents(&mut out, &contents) {
        log::warn!("writing contents: {}", e);
    }
    Ok(())
}

fn main() {
    let mut argv = env::args();
    let program = argv.next().unwrap_or_else(|| "fat12".into());

    let Some(args) = parse_args(argv) else {
        eprintln!("{}", usage(&program));
        process::exit(exit_codes::MISSING_ARGUMENTS);
    };
    logging::init(args.level);

    if let Err(code) = run(args) {
        process::exit(code);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fat12::filesys::fat12::image::ImageBuilder;
    use fat12::Geometry;
    use std::fs;
    use std::path::PathBuf;

    struct TempImage(PathBuf);

    impl TempImage {
        fn new(tag: &str, bytes: &[u8]) -> Self {
            let name = format!("fat12-cli-{}-{}.img", tag, std::process::id());
            let path = std::env::temp_dir().join(name);
            fs::write(&path, bytes).unwrap();
            TempImage(path)
        }

        fn args(&self, file: &str) -> Args {
            Args {
                image: self.0.to_string_lossy().into_owned(),
                file: Some(file.to_string()),
                list: false,
                level: LevelFilter::Off,
                options: OpenOptions::default(),
            }
        }
    }

    impl Drop for TempImage {
        fn drop(&mut self) {
            let _ = fs::remove_file(&self.0);
        }
    }

    fn floppy() -> Vec<u8> {
        let mut builder = ImageBuilder::new(Geometry::default());
        builder.add_file(*b"HELLO   TXT", b"hello\n");
        builder.build()
    }

    fn args(list: &[&str]) -> Option<Args> {
        parse_args(list.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_parse_args() {
        assert!(args(&[]).is_none());
        assert!(args(&["floppy.img"]).is_none());

        let parsed = args(&["-v", "floppy.img", "TEST    TXT"]).unwrap();
        assert_eq!(parsed.image, "floppy.img");
        assert_eq!(parsed.file.as_deref(), Some("TEST    TXT"));
        assert_eq!(parsed.level, LevelFilter::Debug);

        let parsed = args(&["-l", "--strict", "floppy.img"]).unwrap();
        assert!(parsed.list);
        assert!(parsed.options.strict);
        assert!(parsed.file.is_none());
    }

    #[test]
    fn test_usage_lists_every_flag() {
        let text = usage("fat12");
        for flag in ["-v", "-vv", "-q", "-l", "--strict", "--skip-free"] {
            assert!(text.contains(flag), "{} missing from {:?}", flag, text);
        }
        assert_eq!(args(&["-q", "floppy.img", "A"]).unwrap().level, LevelFilter::Warn);
    }

    #[test]
    fn test_run_reads_file() {
        let image = TempImage::new("ok", &floppy());
        assert_eq!(run(image.args("HELLO.TXT")), Ok(()));
        assert_eq!(run(image.args("HELLO   TXT")), Ok(()));

        let mut listing = image.args("");
        listing.file = None;
        listing.list = true;
        assert_eq!(run(listing), Ok(()));
    }

    #[test]
    fn test_run_exit_codes() {
        let missing = TempImage(std::env::temp_dir().join("fat12-cli-no-such-image.img"));
        assert_eq!(run(missing.args("HELLO.TXT")), Err(exit_codes::IMAGE_OPEN_FAILED));

        let image = floppy();
        let tiny = TempImage::new("boot", &image[..40]);
        assert_eq!(run(tiny.args("HELLO.TXT")), Err(exit_codes::BOOT_SECTOR_FAILED));

        let no_fat = TempImage::new("fat", &image[..4 * 512]);
        assert_eq!(run(no_fat.args("HELLO.TXT")), Err(exit_codes::FAT_LOAD_FAILED));

        let no_root = TempImage::new("root", &image[..20 * 512]);
        assert_eq!(run(no_root.args("HELLO.TXT")), Err(exit_codes::ROOT_DIR_LOAD_FAILED));

        let whole = TempImage::new("whole", &image);
        assert_eq!(run(whole.args("MISSING.TXT")), Err(exit_codes::FILE_NOT_FOUND));
        assert_eq!(run(whole.args("hello.txt")), Err(exit_codes::FILE_NOT_FOUND));
    }

    #[test]
    fn test_run_bad_cluster() {
        let mut builder = ImageBuilder::new(Geometry::default());
        let first = builder.add_file(*b"BROKEN  DAT", &[0x42; 1500]);
        builder.set_entry(first + 1, 0xFF7);
        let image = TempImage::new("bad", &builder.build());
        assert_eq!(run(image.args("BROKEN.DAT")), Err(exit_codes::FILE_READ_FAILED));
    }

    #[test]
    fn test_write_contents() {
        let mut out = Vec::new();
        write_contents(&mut out, b"Hi there\n\x00\xff!").unwrap();
        assert_eq!(out, b"Hi there\n<00><ff>!\n");
    }
}
