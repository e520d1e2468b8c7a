#[cfg(feature = "cli")]
mod cli {
    use anyhow::{Context, Result};
    use clap::{Parser, Subcommand};
    use std::path::PathBuf;
    use std::sync::Arc;
    use voxbridge::audio::EnergyClassifier;
    use voxbridge::audio::WavSampleSource;
    use voxbridge::audio::source::SampleSource;
    use voxbridge::config::Config;
    use voxbridge::pipeline::sink::{AudioSink, CollectorSink};
    use voxbridge::pipeline::{Pipeline, PipelineComponents, PipelineConfig};
    use voxbridge::services::{MockSpeechToText, MockSynthesizer, MockTranslator};

    #[derive(Parser)]
    #[command(name = "voxbridge", version, about = "Real-time speech-to-speech translation")]
    struct Cli {
        #[command(subcommand)]
        command: Command,
    }

    #[derive(Subcommand)]
    enum Command {
        /// Run the translation pipeline
        Run {
            /// Configuration file path
            #[arg(short, long)]
            config: Option<PathBuf>,
            /// Read audio from a WAV file instead of the microphone
            #[arg(long)]
            wav: Option<PathBuf>,
            /// Write synthesized audio to a WAV file instead of the speaker
            #[arg(short, long)]
            output: Option<PathBuf>,
            /// Suppress status messages
            #[arg(short, long)]
            quiet: bool,
            /// Increase diagnostic output
            #[arg(short, long, action = clap::ArgAction::Count)]
            verbose: u8,
        },
        /// List available audio input devices
        Devices,
    }

    pub fn main() -> Result<()> {
        match Cli::parse().command {
            Command::Run {
                config,
                wav,
                output,
                quiet,
                verbose,
            } => run(config, wav, output, quiet, verbose),
            Command::Devices => devices(),
        }
    }

    fn devices() -> Result<()> {
        #[cfg(feature = "cpal-audio")]
        {
            for name in voxbridge::audio::list_devices()? {
                println!("{}", name);
            }
            Ok(())
        }
        #[cfg(not(feature = "cpal-audio"))]
        {
            anyhow::bail!("voxbridge was built without the \"cpal-audio\" feature");
        }
    }

    fn load_config(path: Option<PathBuf>) -> Result<Config> {
        let path = path.unwrap_or_else(Config::default_path);
        let config = Config::load_or_default(&path)
            .with_context(|| format!("loading {}", path.display()))?;
        Ok(config.with_env_overrides())
    }

    fn make_source(
        config: &Config,
        wav: Option<PathBuf>,
    ) -> Result<Box<dyn SampleSource>> {
        if let Some(path) = wav {
            let source = WavSampleSource::from_path(&path)
                .with_context(|| format!("reading {}", path.display()))?;
            return Ok(Box::new(source));
        }

        #[cfg(feature = "cpal-audio")]
        {
            let source =
                voxbridge::audio::CpalSampleSource::new(config.audio.input_device.as_deref())?;
            Ok(Box::new(source))
        }
        #[cfg(not(feature = "cpal-audio"))]
        {
            let _ = config;
            anyhow::bail!("no audio source: pass --wav or build with the \"cpal-audio\" feature");
        }
    }

    fn make_sink(output: Option<&PathBuf>) -> Result<Box<dyn AudioSink>> {
        if output.is_some() {
            return Ok(Box::new(CollectorSink::new()));
        }

        #[cfg(feature = "cpal-audio")]
        {
            let sink = voxbridge::audio::SpeakerSink::new(voxbridge::defaults::TTS_SAMPLE_RATE)?;
            Ok(Box::new(sink))
        }
        #[cfg(not(feature = "cpal-audio"))]
        {
            anyhow::bail!("no audio output: pass --output or build with the \"cpal-audio\" feature");
        }
    }

    fn make_components(
        config: &Config,
        wav: Option<PathBuf>,
        output: Option<&PathBuf>,
    ) -> Result<PipelineComponents> {
        let services = &config.services;

        #[cfg(feature = "remote-services")]
        if let (Some(stt_url), Some(translation_url), Some(tts_url)) = (
            services.stt_url.as_deref(),
            services.translation_url.as_deref(),
            services.tts_url.as_deref(),
        ) {
            use voxbridge::services::remote::{
                HttpSpeechToText, HttpSynthesizer, HttpTranslator,
            };
            return Ok(PipelineComponents {
                source: make_source(config, wav)?,
                classifier: Box::new(EnergyClassifier::new()),
                stt: Arc::new(HttpSpeechToText::new(
                    stt_url,
                    &services.source_language,
                    services.api_key.clone(),
                )?),
                translator: Arc::new(HttpTranslator::new(
                    translation_url,
                    &services.source_language,
                    &services.target_language,
                    services.api_key.clone(),
                )?),
                synthesizer: Arc::new(HttpSynthesizer::new(
                    tts_url,
                    voxbridge::defaults::TTS_SAMPLE_RATE,
                    services.api_key.clone(),
                )?),
                sink: make_sink(output)?,
            });
        }

        // No service endpoints configured: echo pipeline with mock services,
        // useful for checking segmentation and audio plumbing end to end.
        eprintln!("voxbridge: no service endpoints configured, running with mock services");
        Ok(PipelineComponents {
            source: make_source(config, wav)?,
            classifier: Box::new(EnergyClassifier::new()),
            stt: Arc::new(MockSpeechToText::new(&services.source_language)),
            translator: Arc::new(MockTranslator::new(&services.target_language)),
            synthesizer: Arc::new(MockSynthesizer::new()),
            sink: make_sink(output)?,
        })
    }

    fn run(
        config_path: Option<PathBuf>,
        wav: Option<PathBuf>,
        output: Option<PathBuf>,
        quiet: bool,
        verbose: u8,
    ) -> Result<()> {
        let config = load_config(config_path)?;
        let from_file = wav.is_some();
        let components = make_components(&config, wav, output.as_ref())?;

        let pipeline_config = PipelineConfig {
            segmenter: config.segmenter.to_segmenter_config(),
            sample_rate: config.audio.sample_rate,
            channels: config.audio.channels,
            quiet,
            verbosity: verbose,
            ..Default::default()
        };

        let mut pipeline = Pipeline::new(pipeline_config, components);
        pipeline.start()?;

        if !quiet {
            eprintln!("voxbridge: pipeline running, press Enter to stop");
        }

        if from_file {
            // Wait until the file is fully drained through the pipeline
            while pipeline
                .health_check()
                .stages
                .get("capture")
                .is_some_and(|s| s.is_running)
            {
                std::thread::sleep(std::time::Duration::from_millis(100));
            }
            // Allow in-flight utterances to clear the downstream stages
            std::thread::sleep(std::time::Duration::from_millis(500));
        } else {
            let mut line = String::new();
            let _ = std::io::stdin().read_line(&mut line);
        }

        let collected = pipeline.stop();

        if let Some(path) = output {
            let samples = collected.unwrap_or_default();
            write_wav(&path, &samples, voxbridge::defaults::TTS_SAMPLE_RATE)?;
            if !quiet {
                eprintln!(
                    "voxbridge: wrote {} samples to {}",
                    samples.len(),
                    path.display()
                );
            }
        }

        Ok(())
    }

    fn write_wav(path: &PathBuf, samples: &[i16], sample_rate: u32) -> Result<()> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec)
            .with_context(|| format!("creating {}", path.display()))?;
        for &sample in samples {
            writer.write_sample(sample)?;
        }
        writer.finalize()?;
        Ok(())
    }
}

#[cfg(feature = "cli")]
fn main() -> anyhow::Result<()> {
    cli::main()
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("voxbridge was built without the \"cli\" feature");
    std::process::exit(1);
}
