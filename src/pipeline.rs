//! Directory-wide run: sidecars, frames, movie, cleanup.

use std::{
    fs,
    path::{Path, PathBuf},
};

use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use tracing::{debug, info, warn};

use crate::{
    annotate::{self, CaptionStyle},
    config::Config,
    convert,
    error::{Error, Result},
    exif::{ExtractedTags, TagReader},
    params, rename, sidecar,
    utils::{self, Confirm},
    video::{self, EncodeOutcome, FrameEncoder},
};

/// What a run produced
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    pub sidecars: usize,
    pub renamed: usize,
    pub frames: usize,
    pub movie: Option<PathBuf>,
    pub encoder_failed: bool,
    pub sidecars_removed: usize,
}

#[derive(Debug, Clone)]
struct Dirs {
    input: PathBuf,
    output: PathBuf,
}

pub struct Pipeline<'a> {
    config: &'a Config,
    tags: &'a dyn TagReader,
    encoder: &'a dyn FrameEncoder,
    confirm: &'a mut dyn Confirm,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        config: &'a Config,
        tags: &'a dyn TagReader,
        encoder: &'a dyn FrameEncoder,
        confirm: &'a mut dyn Confirm,
    ) -> Self {
        Self {
            config,
            tags,
            encoder,
            confirm,
        }
    }

    pub fn run(&mut self) -> Result<Summary> {
        let dirs = self.resolve_dirs()?;
        let mut summary = Summary::default();

        if !self.config.skip_sidecars {
            self.emit_sidecars(&dirs, &mut summary)?;
        }
        self.convert_frames(&dirs, &mut summary)?;
        if !self.config.skip_movie {
            self.assemble_video(&dirs, &mut summary)?;
        }
        if !self.config.keep_sidecars {
            self.cleanup(&dirs, &mut summary)?;
        }

        info!(
            "done: {} json files ({} renamed), {} frames",
            summary.sidecars, summary.renamed, summary.frames
        );
        Ok(summary)
    }

    fn resolve_dirs(&mut self) -> Result<Dirs> {
        let input = match &self.config.input_dir {
            Some(dir) => dir.clone(),
            None => {
                let question = "No directory specified using --input-dir. \
                                Are you sure you want to continue with current directory";
                if !self.confirm.confirm(question, true)? {
                    return Err(Error::UserDeclined("no input directory".into()));
                }
                std::env::current_dir()?
            }
        };
        let output = self
            .config
            .output_dir
            .clone()
            .unwrap_or_else(|| input.clone());
        debug!("input {}, output {}", input.display(), output.display());
        Ok(Dirs { input, output })
    }

    fn emit_sidecars(&self, dirs: &Dirs, summary: &mut Summary) -> Result<()> {
        let images = utils::list_source_images(&dirs.input)?;
        if images.is_empty() {
            return Err(Error::NoImagesForSidecars(dirs.input.clone()));
        }
        info!("creating json files from {} PNG files", images.len());
        if self.config.rename.enabled {
            info!("also renaming PNG files using modify date");
        }
        utils::mkdir(&dirs.output)?;

        let total = images.len();
        let pb = utils::progress_bar(total, "json", self.config.verbose);
        for (i, image) in images.iter().enumerate() {
            let tags = ExtractedTags::read(self.tags, image)?;
            debug!(
                "source file {}, modify date {:?}, parameters {:?}",
                &tags.source_file, &tags.modify_date, &tags.parameters_text
            );

            let path =
                rename::canonicalize(image, tags.modify_date.as_ref(), &self.config.rename)?;
            if path != *image {
                summary.renamed += 1;
            }

            let record = params::parse(tags.parameters_text.as_deref());
            if record.is_absent() {
                debug!("{} has no Parameters tag", image.display());
            }
            let written = sidecar::write(&dirs.output, &utils::file_stem(&path), &record)?;
            summary.sidecars += 1;
            debug!("[{}/{}] {}", i + 1, total, written.display());
            pb.inc(1);
        }
        pb.finish_and_clear();
        Ok(())
    }

    fn convert_frames(&self, dirs: &Dirs, summary: &mut Summary) -> Result<()> {
        let images = utils::list_source_images(&dirs.input)?;
        if images.is_empty() {
            return Err(Error::NoImagesToConvert(dirs.input.clone()));
        }
        info!("converting {} PNG files to JPEG", images.len());

        let style = if self.config.annotate {
            info!("also annotating frames with data from json files");
            let style =
                CaptionStyle::resolve(self.config.font.as_deref(), self.config.font_size)?;
            if style.font.is_none() {
                warn!("no usable font found (see --font), frames get an empty caption bar");
            }
            Some(style)
        } else {
            None
        };
        utils::mkdir(&dirs.output)?;

        let config = self.config;
        let output = dirs.output.as_path();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.nproc)
            .build()?;
        let pb = utils::progress_bar(images.len(), "jpeg", config.verbose);
        let frames = pool.install(|| {
            images
                .par_iter()
                .map(|image| -> Result<PathBuf> {
                    let frame = convert_frame(image, output, config, style.as_ref())?;
                    pb.inc(1);
                    Ok(frame)
                })
                .collect::<Result<Vec<PathBuf>>>()
        })?;
        pb.finish_and_clear();
        summary.frames = frames.len();
        Ok(())
    }

    fn assemble_video(&mut self, dirs: &Dirs, summary: &mut Summary) -> Result<()> {
        let movie = dirs.output.join(&self.config.movie_file);
        if movie.exists() {
            if self.config.overwrite_movie {
                debug!("deleting {}", movie.display());
            } else {
                let question = format!(
                    "Movie file {} exists, use --overwrite-movie to avoid in future. Delete",
                    movie.display()
                );
                if !self.confirm.confirm(&question, false)? {
                    return Err(Error::UserDeclined(format!(
                        "movie file {} kept",
                        movie.display()
                    )));
                }
            }
            fs::remove_file(&movie)?;
        }

        let frames = video::collect_frames(&dirs.output)?;
        info!("creating movie file {} from {} frames", movie.display(), frames.len());
        if let Some(rate) = self.config.frame_rate {
            info!("using frame rate {rate}");
            warn!("last frame of movie file may not be viewable for non-default frame rates");
        }

        let outcome =
            self.encoder
                .encode(&frames, &movie, self.config.frame_rate, self.config.verbose)?;
        video::report(outcome, &movie);
        summary.encoder_failed = outcome != EncodeOutcome::Created;
        summary.movie = Some(movie);
        Ok(())
    }

    fn cleanup(&self, dirs: &Dirs, summary: &mut Summary) -> Result<()> {
        for image in utils::list_source_images(&dirs.input)? {
            let stem = utils::file_stem(&image);
            if sidecar::remove(&dirs.output, &stem)? {
                debug!("deleted {}", sidecar::sidecar_path(&dirs.output, &stem).display());
                summary.sidecars_removed += 1;
            }
        }
        Ok(())
    }
}

fn convert_frame(
    image: &Path,
    output: &Path,
    config: &Config,
    style: Option<&CaptionStyle>,
) -> Result<PathBuf> {
    let stem = utils::file_stem(image);
    let dest = convert::frame_path(output, &stem);
    match style {
        Some(style) => {
            let frame = convert::load(image)?;
            let frame = annotate::annotate_frame(frame, output, &stem, style)?;
            convert::save(&frame, &dest, config.jpeg_quality)?;
        }
        None => convert::convert(image, &dest, config.jpeg_quality)?,
    }
    debug!("frame {} saved", dest.display());
    Ok(dest)
}
