use std::path::{Path, PathBuf};

use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::video_writer::VideoWriter;

/// Encodes video frames via ffmpeg-next, then finishes the container by
/// remuxing the source's audio packets verbatim.
///
/// The encoder defaults to MPEG4 for compatibility and can be overridden by
/// name (`libx264`, `hevc`, ...). Source streams that are neither video nor
/// audio (subtitles, data tracks) are dropped with a warning.
pub struct FfmpegWriter {
    encoder_name: Option<String>,
    output_path: Option<PathBuf>,
    source_path: Option<PathBuf>,
    octx: Option<ffmpeg_next::format::context::Output>,
    encoder: Option<ffmpeg_next::codec::encoder::video::Encoder>,
    scaler: Option<ffmpeg_next::software::scaling::Context>,
    width: u32,
    height: u32,
    fps: f64,
    frame_count: usize,
    video_stream_index: usize,
}

// Safety: FfmpegWriter is only used from a single thread at a time.
// The raw pointers inside ffmpeg types are not shared across threads.
unsafe impl Send for FfmpegWriter {}

impl FfmpegWriter {
    pub fn new() -> Self {
        Self::with_encoder(None)
    }

    /// `encoder_name` overrides the default MPEG4 encoder; the name must be
    /// known to the linked ffmpeg (`ffmpeg -encoders`).
    pub fn with_encoder(encoder_name: Option<String>) -> Self {
        Self {
            encoder_name,
            output_path: None,
            source_path: None,
            octx: None,
            encoder: None,
            scaler: None,
            width: 0,
            height: 0,
            fps: 0.0,
            frame_count: 0,
            video_stream_index: 0,
        }
    }

    fn find_codec(&self) -> Result<ffmpeg_next::Codec, Box<dyn std::error::Error>> {
        match &self.encoder_name {
            Some(name) => ffmpeg_next::encoder::find_by_name(name)
                .ok_or_else(|| format!("encoder not found: {name}").into()),
            None => ffmpeg_next::encoder::find(ffmpeg_next::codec::Id::MPEG4)
                .ok_or_else(|| "MPEG4 encoder not found".into()),
        }
    }

    fn fps_i(&self) -> i32 {
        let fps = self.fps.round() as i32;
        if fps <= 0 {
            30
        } else {
            fps
        }
    }
}

impl Default for FfmpegWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl VideoWriter for FfmpegWriter {
    fn open(
        &mut self,
        path: &Path,
        metadata: &VideoMetadata,
    ) -> Result<(), Box<dyn std::error::Error>> {
        ffmpeg_next::init()?;

        self.width = metadata.width;
        self.height = metadata.height;
        self.fps = metadata.fps;
        self.output_path = Some(path.to_path_buf());
        self.source_path = metadata.source_path.clone();

        let mut octx = ffmpeg_next::format::output(path)?;

        let global_header = octx
            .format()
            .flags()
            .contains(ffmpeg_next::format::Flags::GLOBAL_HEADER);

        let codec = self.find_codec()?;

        let mut ost = octx.add_stream(Some(codec))?;

        let mut encoder_ctx = ffmpeg_next::codec::context::Context::new_with_codec(codec)
            .encoder()
            .video()?;

        encoder_ctx.set_width(metadata.width);
        encoder_ctx.set_height(metadata.height);
        encoder_ctx.set_format(ffmpeg_next::format::Pixel::YUV420P);

        let fps_i = self.fps_i();
        encoder_ctx.set_time_base(ffmpeg_next::Rational(1, fps_i));
        encoder_ctx.set_frame_rate(Some(ffmpeg_next::Rational(fps_i, 1)));

        if global_header {
            encoder_ctx.set_flags(ffmpeg_next::codec::Flags::GLOBAL_HEADER);
        }

        let encoder = encoder_ctx.open_with(ffmpeg_next::Dictionary::new())?;
        ost.set_parameters(&encoder);

        self.video_stream_index = 0; // first stream

        octx.write_header()?;

        // Set up RGB -> YUV scaler
        let scaler = ffmpeg_next::software::scaling::Context::get(
            ffmpeg_next::format::Pixel::RGB24,
            metadata.width,
            metadata.height,
            ffmpeg_next::format::Pixel::YUV420P,
            metadata.width,
            metadata.height,
            ffmpeg_next::software::scaling::Flags::BILINEAR,
        )?;

        self.octx = Some(octx);
        self.encoder = Some(encoder);
        self.scaler = Some(scaler);
        self.frame_count = 0;

        Ok(())
    }

    fn write(&mut self, frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
        let encoder = self.encoder.as_mut().ok_or("FfmpegWriter: not opened")?;
        let scaler = self.scaler.as_mut().ok_or("FfmpegWriter: not opened")?;
        let octx = self.octx.as_mut().ok_or("FfmpegWriter: not opened")?;

        // Create RGB frame from input data
        let mut rgb_frame = ffmpeg_next::util::frame::video::Video::new(
            ffmpeg_next::format::Pixel::RGB24,
            self.width,
            self.height,
        );

        let stride = rgb_frame.stride(0);
        let data = rgb_frame.data_mut(0);
        let src = frame.data();

        // Copy pixel data, respecting stride
        for row in 0..self.height as usize {
            let src_start = row * self.width as usize * 3;
            let dst_start = row * stride;
            data[dst_start..dst_start + self.width as usize * 3]
                .copy_from_slice(&src[src_start..src_start + self.width as usize * 3]);
        }

        // Convert RGB -> YUV
        let mut yuv_frame = ffmpeg_next::util::frame::video::Video::empty();
        scaler.run(&rgb_frame, &mut yuv_frame)?;
        yuv_frame.set_pts(Some(self.frame_count as i64));

        let fps_i = {
            let fps = self.fps.round() as i32;
            if fps <= 0 {
                30
            } else {
                fps
            }
        };

        encoder.send_frame(&yuv_frame)?;

        let ost_time_base = octx
            .stream(self.video_stream_index)
            .ok_or("output stream missing")?
            .time_base();

        let mut encoded = ffmpeg_next::Packet::empty();
        while encoder.receive_packet(&mut encoded).is_ok() {
            encoded.set_stream(self.video_stream_index);
            encoded.rescale_ts(ffmpeg_next::Rational(1, fps_i), ost_time_base);
            encoded.write_interleaved(octx)?;
        }

        self.frame_count += 1;
        Ok(())
    }

    fn close(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(ref mut encoder) = self.encoder {
            let fps_i = {
                let fps = self.fps.round() as i32;
                if fps <= 0 {
                    30
                } else {
                    fps
                }
            };

            let octx = self.octx.as_mut().ok_or("FfmpegWriter: not opened")?;
            let ost_time_base = octx
                .stream(self.video_stream_index)
                .ok_or("output stream missing")?
                .time_base();

            // Flush encoder
            encoder.send_eof()?;
            let mut encoded = ffmpeg_next::Packet::empty();
            while encoder.receive_packet(&mut encoded).is_ok() {
                encoded.set_stream(self.video_stream_index);
                encoded.rescale_ts(ffmpeg_next::Rational(1, fps_i), ost_time_base);
                encoded.write_interleaved(octx)?;
            }

            octx.write_trailer()?;
        }

        self.octx = None;
        self.encoder = None;
        self.scaler = None;

        // If the source has audio, remux its packets into the output
        // untouched. A remux failure fails the close: an output that
        // silently lost its audio must not count as written.
        if let (Some(source_path), Some(output_path)) =
            (self.source_path.take(), self.output_path.take())
        {
            mux_audio(&source_path, &output_path)?;
        }

        Ok(())
    }
}

/// Copies audio from `source` into `video_output` by remuxing.
///
/// Creates a temp file with both video + audio, then replaces the original
/// output. A source without audio is left alone. Streams that are neither
/// video nor audio are not carried over.
fn mux_audio(source: &Path, video_output: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let ictx_source = ffmpeg_next::format::input(source)?;

    let has_audio = ictx_source
        .streams()
        .best(ffmpeg_next::media::Type::Audio)
        .is_some();

    for stream in ictx_source.streams() {
        let medium = stream.parameters().medium();
        if medium != ffmpeg_next::media::Type::Video && medium != ffmpeg_next::media::Type::Audio {
            log::warn!(
                "dropping unsupported stream {} ({medium:?}) from {}",
                stream.index(),
                source.display()
            );
        }
    }

    if !has_audio {
        return Ok(());
    }

    drop(ictx_source);

    let ext = video_output
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("mp4");
    let temp_path = video_output.with_extension(format!("_mux.{ext}"));

    // A half-written temp container must not survive a failed remux.
    if let Err(e) = remux_into(source, video_output, &temp_path) {
        if temp_path.exists() {
            if let Err(remove_err) = std::fs::remove_file(&temp_path) {
                log::warn!(
                    "could not remove temp mux file {}: {remove_err}",
                    temp_path.display()
                );
            }
        }
        return Err(e);
    }

    // Replace original output with muxed version
    std::fs::rename(&temp_path, video_output)?;

    Ok(())
}

/// Writes video packets from `video_output` and audio packets from `source`
/// into a fresh container at `temp_path`.
fn remux_into(
    source: &Path,
    video_output: &Path,
    temp_path: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut ictx_source = ffmpeg_next::format::input(source)?;
    let mut ictx_video = ffmpeg_next::format::input(video_output)?;

    let mut octx = ffmpeg_next::format::output(temp_path)?;

    // Map video streams from the freshly encoded file
    let mut video_stream_map: Vec<isize> = vec![-1; ictx_video.nb_streams() as usize];
    let mut audio_stream_map: Vec<isize> = vec![-1; ictx_source.nb_streams() as usize];
    let mut ost_index: usize = 0;

    for (idx, stream) in ictx_video.streams().enumerate() {
        if stream.parameters().medium() == ffmpeg_next::media::Type::Video {
            let mut ost =
                octx.add_stream(ffmpeg_next::encoder::find(ffmpeg_next::codec::Id::None))?;
            ost.set_parameters(stream.parameters());
            unsafe {
                (*ost.parameters().as_mut_ptr()).codec_tag = 0;
            }
            video_stream_map[idx] = ost_index as isize;
            ost_index += 1;
        }
    }

    // Map audio streams from source
    for (idx, stream) in ictx_source.streams().enumerate() {
        if stream.parameters().medium() == ffmpeg_next::media::Type::Audio {
            let mut ost =
                octx.add_stream(ffmpeg_next::encoder::find(ffmpeg_next::codec::Id::None))?;
            ost.set_parameters(stream.parameters());
            unsafe {
                (*ost.parameters().as_mut_ptr()).codec_tag = 0;
            }
            audio_stream_map[idx] = ost_index as isize;
            ost_index += 1;
        }
    }

    octx.write_header()?;

    // Copy video packets
    let video_time_bases: Vec<_> = ictx_video.streams().map(|s| s.time_base()).collect();

    for (stream, mut packet) in ictx_video.packets() {
        let ist_idx = stream.index();
        let ost_idx = video_stream_map[ist_idx];
        if ost_idx < 0 {
            continue;
        }
        let ost_time_base = octx
            .stream(ost_idx as usize)
            .ok_or("output stream missing")?
            .time_base();
        packet.rescale_ts(video_time_bases[ist_idx], ost_time_base);
        packet.set_position(-1);
        packet.set_stream(ost_idx as usize);
        packet.write_interleaved(&mut octx)?;
    }

    // Copy audio packets byte for byte
    let audio_time_bases: Vec<_> = ictx_source.streams().map(|s| s.time_base()).collect();

    for (stream, mut packet) in ictx_source.packets() {
        let ist_idx = stream.index();
        let ost_idx = audio_stream_map[ist_idx];
        if ost_idx < 0 {
            continue;
        }
        let ost_time_base = octx
            .stream(ost_idx as usize)
            .ok_or("output stream missing")?
            .time_base();
        packet.rescale_ts(audio_time_bases[ist_idx], ost_time_base);
        packet.set_position(-1);
        packet.set_stream(ost_idx as usize);
        packet.write_interleaved(&mut octx)?;
    }

    octx.write_trailer()?;

    Ok(())
}
