use naga::valid::{Capabilities, ValidationFlags, Validator};

use crate::error::{PixeletError, Result, ShaderStage};
use crate::render::{AttributeLayout, ShapeUniforms};

use super::ShaderSource;

/// What the linked pair reads and passes between stages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgramInterface {
    /// `@location`s consumed by the vertex entry point.
    pub attributes: Vec<u32>,
    /// `@location`s consumed by the fragment entry point.
    pub varyings: Vec<u32>,
}

/// Validates both stages of `source` and checks that they form a program
/// usable with the shape pipeline.
///
/// A stage that fails to parse or validate stops the build with
/// [`PixeletError::Compile`] for that stage; the link checks only run when both
/// stages compiled.
pub fn compile_and_link(source: &ShaderSource, layout: &AttributeLayout) -> Result<ProgramInterface> {
    let vertex = compile_stage(ShaderStage::Vertex, &source.vertex)?;
    let fragment = compile_stage(ShaderStage::Fragment, &source.fragment)?;

    let vs = find_entry(&vertex, naga::ShaderStage::Vertex, &source.vertex_entry)
        .ok_or_else(|| {
            PixeletError::Link(format!(
                "vertex stage has no @vertex entry point `{}`",
                source.vertex_entry
            ))
        })?;
    let fs = find_entry(&fragment, naga::ShaderStage::Fragment, &source.fragment_entry)
        .ok_or_else(|| {
            PixeletError::Link(format!(
                "fragment stage has no @fragment entry point `{}`",
                source.fragment_entry
            ))
        })?;

    let mut attributes = Vec::new();
    for arg in &vs.function.arguments {
        collect_locations(&vertex, arg.ty, arg.binding.as_ref(), &mut attributes);
    }
    if !attributes.contains(&layout.slot) {
        return Err(PixeletError::Link(format!(
            "vertex stage does not read the position attribute at @location({})",
            layout.slot
        )));
    }

    let mut outputs = Vec::new();
    if let Some(result) = &vs.function.result {
        collect_locations(&vertex, result.ty, result.binding.as_ref(), &mut outputs);
    }

    let mut varyings = Vec::new();
    for arg in &fs.function.arguments {
        collect_locations(&fragment, arg.ty, arg.binding.as_ref(), &mut varyings);
    }
    if let Some(missing) = varyings.iter().find(|loc| !outputs.contains(loc)) {
        return Err(PixeletError::Link(format!(
            "fragment input @location({missing}) is not written by the vertex stage"
        )));
    }

    check_resources(ShaderStage::Vertex, &vertex)?;
    check_resources(ShaderStage::Fragment, &fragment)?;

    log::debug!(
        "linked shader `{}`: attributes {attributes:?}, varyings {varyings:?}",
        source.label
    );

    Ok(ProgramInterface { attributes, varyings })
}

fn compile_stage(stage: ShaderStage, src: &str) -> Result<naga::Module> {
    let module = naga::front::wgsl::parse_str(src).map_err(|e| PixeletError::Compile {
        stage,
        message: e.emit_to_string(src),
    })?;

    Validator::new(ValidationFlags::all(), Capabilities::all())
        .validate(&module)
        .map_err(|e| PixeletError::Compile {
            stage,
            message: e.as_inner().to_string(),
        })?;

    Ok(module)
}

fn find_entry<'m>(
    module: &'m naga::Module,
    stage: naga::ShaderStage,
    name: &str,
) -> Option<&'m naga::EntryPoint> {
    module
        .entry_points
        .iter()
        .find(|ep| ep.stage == stage && ep.name == name)
}

/// Collects user `@location`s from a binding, or from the members of a struct
/// type when the binding sits on the fields instead.
fn collect_locations(
    module: &naga::Module,
    ty: naga::Handle<naga::Type>,
    binding: Option<&naga::Binding>,
    out: &mut Vec<u32>,
) {
    match binding {
        Some(naga::Binding::Location { location, .. }) => out.push(*location),
        Some(_) => {}
        None => {
            if let naga::TypeInner::Struct { members, .. } = &module.types[ty].inner {
                for member in members {
                    if let Some(naga::Binding::Location { location, .. }) = &member.binding {
                        out.push(*location);
                    }
                }
            }
        }
    }
}

/// The shape pipeline provides exactly one resource: the uniform block at
/// `@group(0) @binding(0)`.
fn check_resources(stage: ShaderStage, module: &naga::Module) -> Result<()> {
    let capacity = std::mem::size_of::<ShapeUniforms>() as u32;

    for (_, var) in module.global_variables.iter() {
        let Some(binding) = &var.binding else { continue };

        let is_shape_block = matches!(var.space, naga::AddressSpace::Uniform)
            && binding.group == 0
            && binding.binding == 0;
        if !is_shape_block {
            return Err(PixeletError::Link(format!(
                "{stage} stage binds @group({}) @binding({}); only the shape uniform block at @group(0) @binding(0) is available",
                binding.group, binding.binding
            )));
        }

        let size = module.types[var.ty].inner.size(module.to_ctx());
        if size > capacity {
            return Err(PixeletError::Link(format!(
                "{stage} stage expects a {size}-byte uniform block, shapes provide {capacity}"
            )));
        }
    }

    Ok(())
}
