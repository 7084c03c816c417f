//! Builder composing the stage list from the stage table

use std::sync::Arc;

use log::{debug, trace};

use super::{StageSlot, predicates};
use crate::{
    config::Config,
    error::{BuildError, Result},
    options::{Format, NormalizedOptions},
    paths::ProjectPaths,
    session::BuildSession,
    stages::{
        BabelStage, CommonJsStage, ExtractErrorsStage, JsonStage, NodeResolveStage, PostcssStage,
        ReplaceStage, ShebangStage, SourceMapsStage, Stage, TerserStage, TypeScriptStage,
    },
};

/// Everything a stage constructor may look at
#[derive(Debug, Clone, Copy)]
pub struct StageContext<'a> {
    pub format: Format,
    pub options: &'a NormalizedOptions,
    pub paths: &'a ProjectPaths,
    pub config: &'a Config,
    pub session: &'a BuildSession,
}

/// Accumulates enabled stages in table order
#[derive(Debug)]
pub struct PipelineBuilder<'a> {
    ctx: StageContext<'a>,
    stages: Vec<Box<dyn Stage>>,
}

impl<'a> PipelineBuilder<'a> {
    pub fn new(ctx: StageContext<'a>) -> Self {
        Self {
            ctx,
            stages: Vec::new(),
        }
    }

    /// Append the slot's stage if its predicate holds
    pub fn add(&mut self, slot: &StageSlot) -> Result<&mut Self> {
        if !(slot.enabled)(self.ctx.format, self.ctx.options) {
            trace!("Skipping stage {} for {}", slot.name, self.ctx.format);
            return Ok(self);
        }
        let stage = (slot.build)(&self.ctx)?;
        debug_assert_eq!(stage.name(), slot.name);
        self.stages.push(stage);
        Ok(self)
    }

    /// Append every slot of a table in order
    pub fn add_all(&mut self, slots: &[StageSlot]) -> Result<&mut Self> {
        for slot in slots {
            self.add(slot)?;
        }
        Ok(self)
    }

    pub fn build(self) -> Vec<Box<dyn Stage>> {
        debug!(
            "Assembled {} stages for {}: {}",
            self.stages.len(),
            self.ctx.format,
            self.stages
                .iter()
                .map(|stage| stage.name())
                .collect::<Vec<_>>()
                .join(" -> ")
        );
        self.stages
    }
}

pub(super) fn extract_errors(ctx: &StageContext<'_>) -> Result<Box<dyn Stage>> {
    let codes = ctx.session.error_codes(&ctx.paths.error_codes)?;
    Ok(Box::new(ExtractErrorsStage::new(codes)))
}

pub(super) fn node_resolve(ctx: &StageContext<'_>) -> Result<Box<dyn Stage>> {
    Ok(Box::new(NodeResolveStage::new(ctx.options.target)))
}

pub(super) fn commonjs(_ctx: &StageContext<'_>) -> Result<Box<dyn Stage>> {
    Ok(Box::new(CommonJsStage::new()))
}

pub(super) fn json(_ctx: &StageContext<'_>) -> Result<Box<dyn Stage>> {
    Ok(Box::new(JsonStage))
}

pub(super) fn shebang(ctx: &StageContext<'_>) -> Result<Box<dyn Stage>> {
    Ok(Box::new(ShebangStage::new(
        ctx.options.name.clone(),
        Arc::clone(ctx.session.shebangs()),
    )))
}

pub(super) fn typescript(ctx: &StageContext<'_>) -> Result<Box<dyn Stage>> {
    let tsconfig = ctx
        .options
        .tsconfig
        .as_deref()
        .map(|path| ctx.paths.resolve(path));
    Ok(Box::new(TypeScriptStage::new(
        ctx.paths.compiler_cache(ctx.format),
        tsconfig.as_deref(),
    )?))
}

pub(super) fn postcss(ctx: &StageContext<'_>) -> Result<Box<dyn Stage>> {
    Ok(Box::new(PostcssStage::new(
        !ctx.options.inline_styles,
        predicates::minimizes_styles(ctx.format, ctx.options),
    )))
}

pub(super) fn babel(ctx: &StageContext<'_>) -> Result<Box<dyn Stage>> {
    Ok(Box::new(BabelStage::new(
        ctx.format,
        ctx.options.target,
        &ctx.config.node_version,
        &ctx.config.import_replacements,
        ctx.options.extract_errors.as_ref(),
    )))
}

pub(super) fn replace(ctx: &StageContext<'_>) -> Result<Box<dyn Stage>> {
    let env = ctx
        .options
        .env
        .ok_or_else(|| BuildError::configuration("environment substitution requires an env"))?;
    Ok(Box::new(ReplaceStage::new(env, ctx.options.app_env.as_deref())))
}

pub(super) fn sourcemaps(_ctx: &StageContext<'_>) -> Result<Box<dyn Stage>> {
    Ok(Box::new(SourceMapsStage))
}

pub(super) fn terser(ctx: &StageContext<'_>) -> Result<Box<dyn Stage>> {
    Ok(Box::new(TerserStage::new(predicates::mangles_toplevel(
        ctx.format,
        ctx.options,
    ))))
}
