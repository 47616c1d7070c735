use anyhow::Result;
use mockfs_kit::{
    DirectoryBackend, FileBackend, FileSystem, MockFileSystem, PathBackend, Platform,
    SearchOption,
};

fn main() -> Result<()> {
    // seeds a Windows-flavoured file system, whatever the host is
    let fs = MockFileSystem::builder()
        .platform(Platform::Windows)
        .current_directory("C:\\work")
        .file("C:\\work\\docs\\first.txt", "Hello")
        .directory("C:\\work\\empty")
        .build()?;

    // `..` never climbs above the drive
    println!("{}", fs.path().get_full_path("..\\..\\..\\second.txt")?);

    // relative to the current directory `C:\work`;
    // the parent `C:\work\docs` already exists
    fs.file().write_all_text("docs\\second.txt", "World")?;

    // legacy rule: `*.txt` also finds `third.txts`
    fs.file().write_all_text("docs\\third.txts", "!")?;
    let found = fs
        .directory()
        .get_files("C:\\WORK", "*.txt", SearchOption::AllDirectories)?;
    println!("found: {found:?}");

    let first = fs.file().read_all_text("C:\\work\\docs\\first.txt")?;
    let second = fs.file().read_all_text("c:/WORK/docs/second.txt")?;
    println!("{first}, {second}!");

    // moves the whole subtree in one step
    fs.directory().move_to("C:\\work\\docs", "C:\\archive\\docs")?;
    assert!(fs.file().exists("C:\\archive\\docs\\first.txt"));
    assert!(!fs.directory().exists("C:\\work\\docs"));

    fs.directory().delete("C:\\archive", true)?;
    println!("left: {:?}", fs.all_paths());
    Ok(())
}
