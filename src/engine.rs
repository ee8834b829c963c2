
use std::{io::Write, path::Path};

use log::{debug, trace, warn};

use crate::{
    error::{Error, Result},
    params::{ByteOrder, Geometry, SumAxes},
    projection::project_luma,
    sink::Sink,
    util::{add_assign_u32, average_u32, saturating_sub_assign_u32},
};

/// Per-axis buffers. Presence of a buffer means the axis is tracked.
#[derive(Debug, Default)]
struct AxisBuffers {
    sums: Option<Vec<u32>>,
    grand: Option<Vec<u32>>,
    background: Option<Vec<u32>>,
}

impl AxisBuffers {
    fn subtract_background(&mut self) {
        if let (Some(sums), Some(background)) =
            (self.sums.as_deref_mut(), self.background.as_deref())
        {
            saturating_sub_assign_u32(sums, background);
        }
    }

    fn accumulate(&mut self) {
        if let (Some(sums), Some(grand)) = (self.sums.as_deref(), self.grand.as_deref_mut()) {
            add_assign_u32(grand, sums);
        }
    }

    fn release(&mut self) {
        self.sums = None;
        self.grand = None;
    }

    fn reset_grand(&mut self, enabled: bool, len: usize) {
        self.grand = (enabled && self.sums.is_some()).then(|| vec![0; len]);
    }

    fn capture_background(&mut self, len: usize, count: u32) {
        if let Some(grand) = self.grand.as_deref() {
            let background = self.background.get_or_insert_with(|| vec![0; len]);
            average_u32(background, grand, count);
        }
    }
}

/// Accumulates row and column luma sums over a batch of images.
///
/// A batch is opened with [`SumEngine::begin`], fed one luma plane at a time
/// through [`SumEngine::process`], and closed with [`SumEngine::end`]. Grand
/// totals, background calibration and the output sink are all optional and
/// may be switched while the batch runs.
///
/// For every processed image the engine:
/// 1. sums each row and column of the plane,
/// 2. subtracts the background profile, clamping at zero,
/// 3. appends the rows then the columns to the sink,
/// 4. adds the corrected sums to the grand totals,
/// 5. bumps the image count.
#[derive(Debug, Default)]
pub struct SumEngine {
    geometry: Option<Geometry>,
    rows: AxisBuffers,
    cols: AxisBuffers,
    image_count: u32,
    sink: Option<Sink>,
    byte_order: ByteOrder,
}

impl SumEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a fresh batch, discarding everything left from a previous one.
    ///
    /// Fails with [`Error::InvalidGeometry`] if `width` is not a positive
    /// multiple of 32 or `height` is zero. On failure the engine is left as it
    /// was.
    pub fn begin(
        &mut self,
        width: u16,
        height: u16,
        want_row_sums: bool,
        want_col_sums: bool,
    ) -> Result<()> {
        self.begin_with_axes(
            width,
            height,
            SumAxes::from_wanted(want_row_sums, want_col_sums),
        )
    }

    pub fn begin_with_axes(&mut self, width: u16, height: u16, axes: SumAxes) -> Result<()> {
        let geometry = Geometry::new(width, height)?;

        if let Some(sink) = self.sink.take() {
            close_sink(sink);
        }
        self.rows = AxisBuffers {
            sums: axes
                .contains(SumAxes::ROWS)
                .then(|| vec![0; geometry.height().get()]),
            ..AxisBuffers::default()
        };
        self.cols = AxisBuffers {
            sums: axes
                .contains(SumAxes::COLS)
                .then(|| vec![0; geometry.width().get()]),
            ..AxisBuffers::default()
        };
        self.image_count = 0;
        self.geometry = Some(geometry);

        debug!("began batch {}x{} tracking {:?}", width, height, axes);
        Ok(())
    }

    /// Opens a new sink at `path`, or detaches the current one when `None`.
    ///
    /// The file is created or truncated. If it cannot be opened the current
    /// sink stays attached.
    pub fn set_sink<P: AsRef<Path>>(&mut self, path: Option<P>) -> Result<()> {
        let sink = path
            .map(|path| Sink::create(path.as_ref(), self.byte_order))
            .transpose()?;
        self.replace_sink(sink);
        Ok(())
    }

    /// Attaches an arbitrary writer as the sink.
    pub fn set_sink_writer(&mut self, writer: Box<dyn Write + Send>) {
        self.replace_sink(Some(Sink::from_writer(writer, self.byte_order)));
    }

    fn replace_sink(&mut self, sink: Option<Sink>) {
        if let Some(old) = self.sink.take() {
            close_sink(old);
        }
        if sink.is_none() {
            debug!("sink detached");
        }
        self.sink = sink;
    }

    /// Sets the byte order used for sink output, including the current sink.
    pub fn set_byte_order(&mut self, byte_order: ByteOrder) {
        self.byte_order = byte_order;
        if let Some(sink) = self.sink.as_mut() {
            sink.set_byte_order(byte_order);
        }
    }

    /// Enables or disables grand-total tracking.
    ///
    /// Either way the existing grand totals are dropped and the image count
    /// restarts from zero. When enabling, totals are only kept for the axes
    /// the batch tracks. Background profiles are left alone.
    pub fn set_grand_totals(&mut self, enabled: bool) {
        let (width, height) = self.dimensions();
        self.rows.reset_grand(enabled, height);
        self.cols.reset_grand(enabled, width);
        self.image_count = 0;
        debug!("grand totals {}", if enabled { "enabled" } else { "disabled" });
    }

    /// Sums one luma plane.
    ///
    /// `luma` must hold exactly `width * height` samples in row-major order.
    /// If the sink write fails the in-memory sums and totals are still
    /// updated, but the record for this image may be missing or incomplete.
    pub fn process(&mut self, luma: &[u8]) -> Result<()> {
        let geometry = self.geometry.ok_or(Error::NotStarted)?;
        if luma.len() != geometry.luma_len() {
            return Err(Error::LumaLength {
                expected: geometry.luma_len(),
                actual: luma.len(),
            });
        }

        project_luma(
            luma,
            geometry.width(),
            geometry.height(),
            self.rows.sums.as_deref_mut(),
            self.cols.sums.as_deref_mut(),
        );

        // Background is removed before anything leaves the engine
        self.rows.subtract_background();
        self.cols.subtract_background();
        let written = match self.sink.as_mut() {
            Some(sink) => write_record(
                sink,
                self.rows.sums.as_deref(),
                self.cols.sums.as_deref(),
            ),
            None => Ok(()),
        };
        self.rows.accumulate();
        self.cols.accumulate();
        self.image_count = self.image_count.wrapping_add(1);

        trace!("processed image {}", self.image_count);
        written
    }

    /// Snapshots the grand totals into a background profile.
    ///
    /// Each background value is the grand total divided by the number of
    /// images accumulated, truncated. The profile is subtracted from every
    /// image processed afterwards. Fails with [`Error::NoImagesAccumulated`]
    /// if no image has been processed since grand totals were last reset.
    pub fn capture_background(&mut self) -> Result<()> {
        if self.image_count == 0 {
            return Err(Error::NoImagesAccumulated);
        }

        let (width, height) = self.dimensions();
        self.rows.capture_background(height, self.image_count);
        self.cols.capture_background(width, self.image_count);
        debug!("captured background over {} images", self.image_count);
        Ok(())
    }

    /// Closes the batch.
    ///
    /// If both a sink and grand totals exist, the grand row totals and then
    /// the grand column totals are appended as a final record. All sum
    /// buffers are released and the sink is closed; background profiles are
    /// kept until the next [`SumEngine::begin`]. Calling this again is a
    /// no-op.
    pub fn end(&mut self) -> Result<()> {
        let mut result = Ok(());
        if let Some(mut sink) = self.sink.take() {
            if self.rows.grand.is_some() || self.cols.grand.is_some() {
                result = write_record(
                    &mut sink,
                    self.rows.grand.as_deref(),
                    self.cols.grand.as_deref(),
                );
            }
            if let Err(source) = sink.close() {
                result = result.and(Err(Error::SinkWrite { source }));
            }
        }

        self.rows.release();
        self.cols.release();
        debug!("ended batch after {} images", self.image_count);
        result
    }

    fn dimensions(&self) -> (usize, usize) {
        self.geometry.map_or((0, 0), |geometry| {
            (geometry.width().get(), geometry.height().get())
        })
    }

    #[must_use]
    pub fn geometry(&self) -> Option<Geometry> {
        self.geometry
    }

    /// Axes that currently have per-image sums.
    #[must_use]
    pub fn axes(&self) -> SumAxes {
        SumAxes::from_wanted(self.rows.sums.is_some(), self.cols.sums.is_some())
    }

    #[must_use]
    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    #[must_use]
    pub fn row_sums(&self) -> Option<&[u32]> {
        self.rows.sums.as_deref()
    }

    #[must_use]
    pub fn col_sums(&self) -> Option<&[u32]> {
        self.cols.sums.as_deref()
    }

    #[must_use]
    pub fn grand_row_sums(&self) -> Option<&[u32]> {
        self.rows.grand.as_deref()
    }

    #[must_use]
    pub fn grand_col_sums(&self) -> Option<&[u32]> {
        self.cols.grand.as_deref()
    }

    #[must_use]
    pub fn row_background(&self) -> Option<&[u32]> {
        self.rows.background.as_deref()
    }

    #[must_use]
    pub fn col_background(&self) -> Option<&[u32]> {
        self.cols.background.as_deref()
    }

    /// Images processed since the batch began or grand totals were toggled.
    #[must_use]
    pub fn image_count(&self) -> u32 {
        self.image_count
    }

    #[must_use]
    pub fn has_sink(&self) -> bool {
        self.sink.is_some()
    }
}

fn write_record(sink: &mut Sink, rows: Option<&[u32]>, cols: Option<&[u32]>) -> Result<()> {
    let write = |sink: &mut Sink| -> std::io::Result<()> {
        if let Some(rows) = rows {
            sink.write_sums(rows)?;
        }
        if let Some(cols) = cols {
            sink.write_sums(cols)?;
        }
        sink.flush()
    };
    write(sink).map_err(|source| Error::SinkWrite { source })
}

fn close_sink(sink: Sink) {
    if let Err(e) = sink.close() {
        warn!("failed to flush sink while closing it: {}", e);
    }
}
