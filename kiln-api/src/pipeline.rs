#[cfg(feature = "kiln-dx12")]
use crate::dx12::KilnPipelineDx12;
use crate::null::KilnPipelineNull;
#[cfg(feature = "kiln-vulkan")]
use crate::vulkan::KilnPipelineVulkan;
use crate::{
    KilnBlendState, KilnComputePsoDef, KilnDepthState, KilnDeviceContext, KilnFormat,
    KilnGraphicsPsoDef, KilnPipelineType, KilnPrimitiveTopology, KilnRasterizerState, KilnResult,
    KilnRootSignature, KilnSampleCount, KilnShader, KilnShaderStageFlags, KilnVertexLayout,
};
use fnv::FnvHasher;
use std::hash::{Hash, Hasher};

/// A finalized native pipeline. Owned by the device context's pipeline cache, PSOs hold
/// clones of it.
#[derive(Clone, Debug)]
pub enum KilnPipeline {
    Null(KilnPipelineNull),
    #[cfg(feature = "kiln-vulkan")]
    Vk(KilnPipelineVulkan),
    #[cfg(feature = "kiln-dx12")]
    Dx12(KilnPipelineDx12),
}

impl KilnPipeline {
    pub fn pipeline_type(&self) -> KilnPipelineType {
        match self {
            KilnPipeline::Null(inner) => inner.pipeline_type(),
            #[cfg(feature = "kiln-vulkan")]
            KilnPipeline::Vk(inner) => inner.pipeline_type(),
            #[cfg(feature = "kiln-dx12")]
            KilnPipeline::Dx12(inner) => inner.pipeline_type(),
        }
    }

    pub fn root_signature(&self) -> &KilnRootSignature {
        match self {
            KilnPipeline::Null(inner) => inner.root_signature(),
            #[cfg(feature = "kiln-vulkan")]
            KilnPipeline::Vk(inner) => inner.root_signature(),
            #[cfg(feature = "kiln-dx12")]
            KilnPipeline::Dx12(inner) => inner.root_signature(),
        }
    }

    pub fn null_pipeline(&self) -> Option<&KilnPipelineNull> {
        match self {
            KilnPipeline::Null(inner) => Some(inner),
            #[cfg(any(feature = "kiln-vulkan", feature = "kiln-dx12"))]
            _ => None,
        }
    }

    #[cfg(feature = "kiln-vulkan")]
    pub fn vk_pipeline(&self) -> Option<&KilnPipelineVulkan> {
        match self {
            KilnPipeline::Vk(inner) => Some(inner),
            _ => None,
        }
    }

    #[cfg(feature = "kiln-dx12")]
    pub fn dx12_pipeline(&self) -> Option<&KilnPipelineDx12> {
        match self {
            KilnPipeline::Dx12(inner) => Some(inner),
            _ => None,
        }
    }
}

pub(crate) fn hash_def<T: Hash>(def: &T) -> u64 {
    let mut hasher = FnvHasher::default();
    def.hash(&mut hasher);
    hasher.finish()
}

/// A graphics pipeline state object. Accumulates state through setters, then `finalize`
/// bakes it into a native pipeline through the device's pipeline cache. An unfinalized
/// PSO can be cloned to use as a template, the clone and the original finalize
/// independently. All setters panic once the PSO is finalized.
#[derive(Debug, Default)]
pub struct KilnGraphicsPso {
    def: KilnGraphicsPsoDef,
    finalized: Option<KilnPipeline>,
}

impl Clone for KilnGraphicsPso {
    fn clone(&self) -> Self {
        assert!(
            self.finalized.is_none(),
            "a finalized graphics PSO cannot be cloned, clone before finalizing to template it"
        );
        KilnGraphicsPso {
            def: self.def.clone(),
            finalized: None,
        }
    }
}

impl KilnGraphicsPso {
    pub fn new() -> Self {
        Default::default()
    }

    fn assert_mutable(&self) {
        assert!(
            self.finalized.is_none(),
            "graphics PSO is finalized and can no longer be changed"
        );
    }

    pub fn set_root_signature(
        &mut self,
        root_signature: &KilnRootSignature,
    ) {
        self.assert_mutable();
        self.def.root_signature = Some(root_signature.clone());
    }

    pub fn set_vertex_shader(
        &mut self,
        shader: &KilnShader,
    ) {
        self.assert_mutable();
        assert_eq!(shader.stage(), KilnShaderStageFlags::VERTEX);
        self.def.vertex_shader = Some(shader.clone());
    }

    pub fn set_pixel_shader(
        &mut self,
        shader: &KilnShader,
    ) {
        self.assert_mutable();
        assert_eq!(shader.stage(), KilnShaderStageFlags::PIXEL);
        self.def.pixel_shader = Some(shader.clone());
    }

    pub fn set_geometry_shader(
        &mut self,
        shader: &KilnShader,
    ) {
        self.assert_mutable();
        assert_eq!(shader.stage(), KilnShaderStageFlags::GEOMETRY);
        self.def.geometry_shader = Some(shader.clone());
    }

    pub fn set_hull_shader(
        &mut self,
        shader: &KilnShader,
    ) {
        self.assert_mutable();
        assert_eq!(shader.stage(), KilnShaderStageFlags::HULL);
        self.def.hull_shader = Some(shader.clone());
    }

    pub fn set_domain_shader(
        &mut self,
        shader: &KilnShader,
    ) {
        self.assert_mutable();
        assert_eq!(shader.stage(), KilnShaderStageFlags::DOMAIN);
        self.def.domain_shader = Some(shader.clone());
    }

    pub fn set_blend_state(
        &mut self,
        blend_state: KilnBlendState,
    ) {
        self.assert_mutable();
        self.def.blend_state = blend_state;
    }

    pub fn set_depth_state(
        &mut self,
        depth_state: KilnDepthState,
    ) {
        self.assert_mutable();
        self.def.depth_state = depth_state;
    }

    pub fn set_rasterizer_state(
        &mut self,
        rasterizer_state: KilnRasterizerState,
    ) {
        self.assert_mutable();
        self.def.rasterizer_state = rasterizer_state;
    }

    pub fn set_vertex_layout(
        &mut self,
        vertex_layout: KilnVertexLayout,
    ) {
        self.assert_mutable();
        self.def.vertex_layout = vertex_layout;
    }

    pub fn set_primitive_topology(
        &mut self,
        topology: KilnPrimitiveTopology,
    ) {
        self.assert_mutable();
        self.def.primitive_topology = topology;
    }

    /// Shorthand for a single color attachment
    pub fn set_render_target_format(
        &mut self,
        color_format: KilnFormat,
        depth_stencil_format: Option<KilnFormat>,
    ) {
        self.set_render_target_formats(&[color_format], depth_stencil_format);
    }

    pub fn set_render_target_formats(
        &mut self,
        color_formats: &[KilnFormat],
        depth_stencil_format: Option<KilnFormat>,
    ) {
        self.assert_mutable();
        self.def.color_formats = color_formats.to_vec();
        self.def.depth_stencil_format = depth_stencil_format;
    }

    pub fn set_sample_count(
        &mut self,
        sample_count: KilnSampleCount,
    ) {
        self.assert_mutable();
        self.def.sample_count = sample_count;
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized.is_some()
    }

    pub fn root_signature(&self) -> Option<&KilnRootSignature> {
        self.def.root_signature.as_ref()
    }

    /// Bakes the accumulated state into a native pipeline. May only be called once.
    /// Identical defs collapse to a single native pipeline through the device's cache.
    #[profiling::function]
    pub fn finalize(
        &mut self,
        device_context: &KilnDeviceContext,
        name: &str,
    ) -> KilnResult<()> {
        assert!(
            self.finalized.is_none(),
            "graphics PSO was already finalized"
        );
        self.def.verify();

        log::trace!("finalizing graphics PSO {:?}", name);
        let hash = hash_def(&self.def);
        let pipeline = device_context.get_or_create_graphics_pipeline(hash, &self.def)?;
        self.finalized = Some(pipeline);
        Ok(())
    }

    /// The finalized pipeline. Panics if `finalize` has not been called.
    pub fn pipeline(&self) -> &KilnPipeline {
        self.finalized
            .as_ref()
            .expect("graphics PSO has not been finalized")
    }
}

/// A compute pipeline state object with the same finalize-once and caching rules as
/// [`KilnGraphicsPso`]
#[derive(Debug, Default)]
pub struct KilnComputePso {
    def: KilnComputePsoDef,
    finalized: Option<KilnPipeline>,
}

impl Clone for KilnComputePso {
    fn clone(&self) -> Self {
        assert!(
            self.finalized.is_none(),
            "a finalized compute PSO cannot be cloned, clone before finalizing to template it"
        );
        KilnComputePso {
            def: self.def.clone(),
            finalized: None,
        }
    }
}

impl KilnComputePso {
    pub fn new() -> Self {
        Default::default()
    }

    fn assert_mutable(&self) {
        assert!(
            self.finalized.is_none(),
            "compute PSO is finalized and can no longer be changed"
        );
    }

    pub fn set_root_signature(
        &mut self,
        root_signature: &KilnRootSignature,
    ) {
        self.assert_mutable();
        self.def.root_signature = Some(root_signature.clone());
    }

    pub fn set_compute_shader(
        &mut self,
        shader: &KilnShader,
    ) {
        self.assert_mutable();
        assert_eq!(shader.stage(), KilnShaderStageFlags::COMPUTE);
        self.def.compute_shader = Some(shader.clone());
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized.is_some()
    }

    pub fn root_signature(&self) -> Option<&KilnRootSignature> {
        self.def.root_signature.as_ref()
    }

    #[profiling::function]
    pub fn finalize(
        &mut self,
        device_context: &KilnDeviceContext,
        name: &str,
    ) -> KilnResult<()> {
        assert!(self.finalized.is_none(), "compute PSO was already finalized");
        self.def.verify();

        log::trace!("finalizing compute PSO {:?}", name);
        let hash = hash_def(&self.def);
        let pipeline = device_context.get_or_create_compute_pipeline(hash, &self.def)?;
        self.finalized = Some(pipeline);
        Ok(())
    }

    pub fn pipeline(&self) -> &KilnPipeline {
        self.finalized
            .as_ref()
            .expect("compute PSO has not been finalized")
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        KilnFormat, KilnRootSignatureDef, KilnRootSignatureFlags, KilnShader,
        KilnShaderModuleDef, KilnShaderStageDef, KilnShaderStageFlags, KilnShaderVisibility,
    };

    fn signature(device_context: &KilnDeviceContext) -> KilnRootSignature {
        let mut def = KilnRootSignatureDef::new(1, 0);
        def.init_as_constant_buffer(0, 0, KilnShaderVisibility::All);
        device_context
            .create_root_signature(&def, "test", KilnRootSignatureFlags::NONE)
            .unwrap()
    }

    fn shader(
        device_context: &KilnDeviceContext,
        stage: KilnShaderStageFlags,
        bytes: &[u8],
    ) -> KilnShader {
        let module = device_context
            .create_shader_module(KilnShaderModuleDef::SpvBytes(bytes))
            .unwrap();
        device_context
            .create_shader(&KilnShaderStageDef {
                shader_module: module,
                entry_point: "main".to_string(),
                stage,
            })
            .unwrap()
    }

    fn basic_pso(
        device_context: &KilnDeviceContext,
        root_signature: &KilnRootSignature,
    ) -> KilnGraphicsPso {
        let mut pso = KilnGraphicsPso::new();
        pso.set_root_signature(root_signature);
        pso.set_vertex_shader(&shader(
            device_context,
            KilnShaderStageFlags::VERTEX,
            b"vertex",
        ));
        pso.set_render_target_format(KilnFormat::R8G8B8A8Unorm, None);
        pso
    }

    #[test]
    fn identical_defs_collapse_to_one_cached_pipeline() {
        let device_context = KilnDeviceContext::new_null();
        let root_signature = signature(&device_context);

        let mut a = basic_pso(&device_context, &root_signature);
        let mut b = basic_pso(&device_context, &root_signature);
        a.finalize(&device_context, "a").unwrap();
        b.finalize(&device_context, "b").unwrap();

        assert_eq!(device_context.cached_pipeline_count(), 1);
        let null = device_context.null_device_context().unwrap();
        assert_eq!(null.pipelines_created(), 1);
        assert_eq!(a.pipeline().pipeline_type(), KilnPipelineType::Graphics);
    }

    #[test]
    fn clones_template_the_state_and_diverge_independently() {
        let device_context = KilnDeviceContext::new_null();
        let root_signature = signature(&device_context);

        let mut base = basic_pso(&device_context, &root_signature);
        let mut variant = base.clone();
        variant.set_render_target_format(KilnFormat::B8G8R8A8Unorm, None);

        base.finalize(&device_context, "base").unwrap();
        variant.finalize(&device_context, "variant").unwrap();

        assert_eq!(device_context.cached_pipeline_count(), 2);
    }

    #[test]
    fn compute_pso_finalizes_through_the_same_cache() {
        let device_context = KilnDeviceContext::new_null();
        let root_signature = signature(&device_context);

        let cs = shader(&device_context, KilnShaderStageFlags::COMPUTE, b"compute");
        let mut a = KilnComputePso::new();
        a.set_root_signature(&root_signature);
        a.set_compute_shader(&cs);
        a.finalize(&device_context, "cull").unwrap();

        let mut b = KilnComputePso::new();
        b.set_root_signature(&root_signature);
        b.set_compute_shader(&cs);
        b.finalize(&device_context, "cull again").unwrap();

        assert_eq!(device_context.cached_pipeline_count(), 1);
        assert_eq!(a.pipeline().pipeline_type(), KilnPipelineType::Compute);
        assert_eq!(b.pipeline().root_signature(), &root_signature);
    }

    #[test]
    fn destroy_all_pipelines_empties_the_cache() {
        let device_context = KilnDeviceContext::new_null();
        let root_signature = signature(&device_context);

        let mut pso = basic_pso(&device_context, &root_signature);
        pso.finalize(&device_context, "pso").unwrap();
        assert_eq!(device_context.cached_pipeline_count(), 1);

        device_context.destroy_all_pipelines();
        assert_eq!(device_context.cached_pipeline_count(), 0);

        // The finalized PSO still holds its pipeline through shared ownership
        assert_eq!(pso.pipeline().pipeline_type(), KilnPipelineType::Graphics);
    }

    #[test]
    #[should_panic(expected = "finalized and can no longer be changed")]
    fn setters_panic_after_finalize() {
        let device_context = KilnDeviceContext::new_null();
        let root_signature = signature(&device_context);
        let mut pso = basic_pso(&device_context, &root_signature);
        pso.finalize(&device_context, "pso").unwrap();
        pso.set_render_target_format(KilnFormat::B8G8R8A8Unorm, None);
    }

    #[test]
    #[should_panic(expected = "was already finalized")]
    fn finalizing_twice_panics() {
        let device_context = KilnDeviceContext::new_null();
        let root_signature = signature(&device_context);
        let mut pso = basic_pso(&device_context, &root_signature);
        pso.finalize(&device_context, "pso").unwrap();
        let _ = pso.finalize(&device_context, "pso");
    }

    #[test]
    #[should_panic(expected = "cannot be cloned")]
    fn cloning_a_finalized_pso_panics() {
        let device_context = KilnDeviceContext::new_null();
        let root_signature = signature(&device_context);
        let mut pso = basic_pso(&device_context, &root_signature);
        pso.finalize(&device_context, "pso").unwrap();
        let _ = pso.clone();
    }

    #[test]
    #[should_panic(expected = "has not been finalized")]
    fn pipeline_access_before_finalize_panics() {
        let device_context = KilnDeviceContext::new_null();
        let root_signature = signature(&device_context);
        let pso = basic_pso(&device_context, &root_signature);
        let _ = pso.pipeline();
    }

    #[test]
    #[should_panic]
    fn wrong_stage_shader_is_rejected() {
        let device_context = KilnDeviceContext::new_null();
        let mut pso = KilnGraphicsPso::new();
        pso.set_vertex_shader(&shader(
            &device_context,
            KilnShaderStageFlags::PIXEL,
            b"pixel",
        ));
    }
}
