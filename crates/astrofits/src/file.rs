use std::path::{Path, PathBuf};

use astrofits_core::error as codes;
use astrofits_core::hdu::{FitsVolume, Hdu, HduInfo};

use crate::errors::{FitsError, Result};
use crate::status::{detail, translate_op};

/// Whether a file is opened for reading or for read-write access.
///
/// This layer never writes; read-write mode only affirms that the caller
/// may hold the file with write intent elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    ReadOnly,
    ReadWrite,
}

/// The kind of the HDU under the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HduKind {
    Primary,
    Image,
    AsciiTable,
    BinaryTable,
}

impl HduKind {
    fn of(info: &HduInfo) -> Self {
        match info {
            HduInfo::Primary { .. } => HduKind::Primary,
            HduInfo::Image { .. } => HduKind::Image,
            HduInfo::AsciiTable { .. } => HduKind::AsciiTable,
            HduInfo::BinaryTable { .. } => HduKind::BinaryTable,
        }
    }

    /// Whether this HDU can hold image pixels.
    pub fn is_image(self) -> bool {
        matches!(self, HduKind::Primary | HduKind::Image)
    }
}

/// Snapshot of the cursor position after a seek.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HduDescriptor {
    /// 1-based index of the HDU now under the cursor.
    pub index: usize,
    /// Kind of that HDU.
    pub kind: HduKind,
    /// Total HDUs in the file.
    pub hdu_count: usize,
}

/// An open FITS file with an explicit cursor over its HDUs.
///
/// The cursor starts at HDU 1 (the primary, FITS convention) and moves
/// only through [`FitsFile::seek_hdu`]; no other operation changes it.
/// After [`FitsFile::close`] every operation fails with `HandleClosed`.
/// One logical operation at a time: the handle holds a single cursor and
/// callers wanting parallel reads open the file once per thread.
#[derive(Debug)]
pub struct FitsFile {
    volume: Option<FitsVolume>,
    filename: PathBuf,
    mode: OpenMode,
    current_hdu: usize,
}

impl FitsFile {
    /// Open the FITS file at `path` and position the cursor at HDU 1.
    pub fn open<P: AsRef<Path>>(path: P, mode: OpenMode) -> Result<Self> {
        let path = path.as_ref();
        let op = format!("open {}", path.display());
        let volume = FitsVolume::open(path).map_err(|e| match e {
            // Map the raw I/O failure onto the canonical open status.
            astrofits_core::Error::Io(_) => {
                FitsError::OpenFailed(detail(codes::FILE_NOT_OPENED, &op))
            }
            other => FitsError::OpenFailed(detail(other.status(), &op)),
        })?;

        Ok(FitsFile {
            volume: Some(volume),
            filename: path.to_path_buf(),
            mode,
            current_hdu: 1,
        })
    }

    /// Release the underlying resource. Safe to call repeatedly; the
    /// second and later calls are no-ops.
    pub fn close(&mut self) -> Result<()> {
        self.volume = None;
        Ok(())
    }

    /// Whether the handle is still open.
    pub fn is_open(&self) -> bool {
        self.volume.is_some()
    }

    /// The path this handle was opened from.
    pub fn filename(&self) -> &Path {
        &self.filename
    }

    /// The mode this handle was opened with.
    pub fn mode(&self) -> OpenMode {
        self.mode
    }

    /// Total number of HDUs in the file.
    pub fn num_hdus(&self) -> Result<usize> {
        Ok(self.volume()?.hdu_count())
    }

    /// 1-based index of the HDU currently under the cursor.
    pub fn current_hdu(&self) -> usize {
        self.current_hdu
    }

    /// Move the cursor to the 1-based `index` and describe the HDU there.
    ///
    /// On failure the cursor is unchanged.
    pub fn seek_hdu(&mut self, index: usize) -> Result<HduDescriptor> {
        let hdu_count = self.volume()?.hdu_count();
        if index < 1 || index > hdu_count {
            return Err(translate_op(
                codes::BAD_HDU_NUM,
                &format!("seek to HDU {index} of {hdu_count}"),
            ));
        }

        self.current_hdu = index;
        let hdu = self.cursor_hdu()?;
        Ok(HduDescriptor {
            index,
            kind: HduKind::of(&hdu.info),
            hdu_count,
        })
    }

    /// The open volume, or `HandleClosed`.
    pub(crate) fn volume(&self) -> Result<&FitsVolume> {
        self.volume.as_ref().ok_or_else(|| {
            FitsError::HandleClosed(detail(
                codes::BAD_FILEPTR,
                &format!("{}", self.filename.display()),
            ))
        })
    }

    /// The HDU under the cursor.
    pub(crate) fn cursor_hdu(&self) -> Result<&Hdu> {
        let volume = self.volume()?;
        volume
            .hdu(self.current_hdu - 1)
            .ok_or_else(|| translate_op(codes::BAD_HDU_NUM, "cursor"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testsupport::{image_file, minimal_file};

    #[test]
    fn open_positions_cursor_at_primary() {
        let (_dir, path) = minimal_file();
        let f = FitsFile::open(&path, OpenMode::ReadOnly).unwrap();
        assert!(f.is_open());
        assert_eq!(f.current_hdu(), 1);
        assert_eq!(f.mode(), OpenMode::ReadOnly);
        assert_eq!(f.filename(), path.as_path());
    }

    #[test]
    fn open_missing_file() {
        let err = FitsFile::open("/no/such/file.fits", OpenMode::ReadOnly).unwrap_err();
        match &err {
            FitsError::OpenFailed(d) => {
                assert_eq!(d.status, 104);
                assert!(d.text.contains("/no/such/file.fits"));
            }
            other => panic!("expected OpenFailed, got {other}"),
        }
    }

    #[test]
    fn open_rejects_non_fits_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garbage.fits");
        std::fs::write(&path, vec![0x55u8; 4096]).unwrap();
        assert!(matches!(
            FitsFile::open(&path, OpenMode::ReadOnly),
            Err(FitsError::OpenFailed(_))
        ));
    }

    #[test]
    fn close_is_idempotent() {
        let (_dir, path) = minimal_file();
        let mut f = FitsFile::open(&path, OpenMode::ReadOnly).unwrap();
        f.close().unwrap();
        assert!(!f.is_open());
        f.close().unwrap();
        f.close().unwrap();
    }

    #[test]
    fn operations_after_close_fail() {
        let (_dir, path) = minimal_file();
        let mut f = FitsFile::open(&path, OpenMode::ReadOnly).unwrap();
        f.close().unwrap();
        assert!(matches!(f.num_hdus(), Err(FitsError::HandleClosed(_))));
        assert!(matches!(f.seek_hdu(1), Err(FitsError::HandleClosed(_))));
    }

    #[test]
    fn seek_valid_and_invalid() {
        let (_dir, path) = image_file(16, &[4, 4], &[0u8; 32]);
        let mut f = FitsFile::open(&path, OpenMode::ReadOnly).unwrap();
        assert_eq!(f.num_hdus().unwrap(), 1);

        let desc = f.seek_hdu(1).unwrap();
        assert_eq!(desc.index, 1);
        assert_eq!(desc.kind, HduKind::Primary);
        assert_eq!(desc.hdu_count, 1);
        assert!(desc.kind.is_image());

        for bad in [0usize, 2, 99] {
            let err = f.seek_hdu(bad).unwrap_err();
            assert!(matches!(err, FitsError::InvalidHduIndex(_)), "{bad}");
            assert_eq!(f.current_hdu(), 1, "cursor must not move on failure");
        }
    }

    #[test]
    fn read_write_mode_is_accepted() {
        let (_dir, path) = minimal_file();
        let f = FitsFile::open(&path, OpenMode::ReadWrite).unwrap();
        assert_eq!(f.mode(), OpenMode::ReadWrite);
    }
}
