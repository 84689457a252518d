//! FINS end codes (main/sub response codes).
//!
//! Every FINS response carries a two-byte end code after the command code.
//! The first byte is the main response code (MRES) and the second the sub
//! response code (SRES). Bit 7 of MRES flags a network relay error; bits 6 and
//! 7 of SRES flag non-fatal and fatal CPU unit errors respectively. The
//! remaining bits select an entry in the table below.
//!
//! ```
//! use omron_fins_channel::EndCode;
//!
//! let code = EndCode::from_codes(0x11, 0x03).unwrap();
//! assert_eq!(code, EndCode::AddressRangeError);
//! assert_eq!(code.to_string(), "Parameter error: address range error");
//! assert!(EndCode::from_codes(0x7E, 0x01).is_none());
//! ```

use std::fmt;

/// Named FINS end codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum EndCode {
    // 0x01 local node error
    /// Local node is not part of the network.
    LocalNodeNotInNetwork,
    /// Token timeout.
    TokenTimeout,
    /// Retries failed.
    RetriesFailed,
    /// Too many send frames.
    TooManySendFrames,
    /// Node address range error.
    NodeAddressRangeError,
    /// Node address duplication.
    NodeAddressDuplication,

    // 0x02 destination node error
    /// Destination node is not part of the network.
    DestinationNodeNotInNetwork,
    /// Unit missing.
    UnitMissing,
    /// Third node missing.
    ThirdNodeMissing,
    /// Destination node busy.
    DestinationNodeBusy,
    /// Response timeout.
    ResponseTimeout,

    // 0x03 controller error
    /// Communications controller error.
    CommunicationsControllerError,
    /// CPU unit error.
    CpuUnitError,
    /// Controller error.
    ControllerError,
    /// Unit number error.
    UnitNumberError,

    // 0x04 service unsupported
    /// Undefined command.
    UndefinedCommand,
    /// Not supported by model or version.
    NotSupportedByModel,

    // 0x05 routing table error
    /// Destination address setting error.
    DestinationAddressSettingError,
    /// No routing tables.
    NoRoutingTables,
    /// Routing table error.
    RoutingTableError,
    /// Too many relays.
    TooManyRelays,

    // 0x10 command format error
    /// Command too long.
    CommandTooLong,
    /// Command too short.
    CommandTooShort,
    /// Elements and data do not match.
    ElementsDataMismatch,
    /// Command format error.
    CommandFormatError,
    /// Header error.
    HeaderError,

    // 0x11 parameter error
    /// Area classification missing.
    AreaClassificationMissing,
    /// Access size error.
    AccessSizeError,
    /// Address range error.
    AddressRangeError,
    /// Address range exceeded.
    AddressRangeExceeded,
    /// Program missing.
    ProgramMissing,
    /// Relational error.
    RelationalError,
    /// Duplicate data access.
    DuplicateDataAccess,
    /// Response too long.
    ResponseTooLong,
    /// Parameter error.
    ParameterError,

    // 0x20 read not possible
    /// Read not possible: protected.
    ReadProtected,
    /// Read not possible: table missing.
    ReadTableMissing,
    /// Read not possible: data missing.
    ReadDataMissing,
    /// Read not possible: program missing.
    ReadProgramMissing,
    /// Read not possible: file missing.
    ReadFileMissing,
    /// Read not possible: data mismatch.
    ReadDataMismatch,

    // 0x21 write not possible
    /// Write not possible: read only.
    WriteReadOnly,
    /// Write not possible: protected.
    WriteProtected,
    /// Write not possible: cannot register.
    WriteCannotRegister,
    /// Write not possible: program missing.
    WriteProgramMissing,
    /// Write not possible: file missing.
    WriteFileMissing,
    /// Write not possible: file name already exists.
    WriteFileNameExists,
    /// Write not possible: cannot change.
    WriteCannotChange,

    // 0x22 not executable in current mode
    /// Not possible during execution.
    NotPossibleDuringExecution,
    /// Not possible while running.
    NotPossibleWhileRunning,
    /// Wrong PLC mode: program.
    WrongModeProgram,
    /// Wrong PLC mode: debug.
    WrongModeDebug,
    /// Wrong PLC mode: monitor.
    WrongModeMonitor,
    /// Wrong PLC mode: run.
    WrongModeRun,
    /// Specified node is not the polling node.
    NotPollingNode,
    /// Step cannot be executed.
    StepCannotBeExecuted,

    // 0x23 no such device
    /// File device missing.
    FileDeviceMissing,
    /// Memory missing.
    MemoryMissing,
    /// Clock missing.
    ClockMissing,

    // 0x24 cannot start/stop
    /// Table missing.
    TableMissing,

    // 0x25 unit error
    /// Memory error.
    UnitMemoryError,
    /// I/O setting error.
    IoSettingError,
    /// Too many I/O points.
    TooManyIoPoints,
    /// CPU bus error.
    CpuBusError,
    /// I/O duplication.
    IoDuplication,
    /// I/O bus error.
    IoBusError,
    /// SYSMAC BUS/2 error.
    SysmacBus2Error,
    /// CPU bus unit error.
    CpuBusUnitError,
    /// SYSMAC BUS number duplication.
    SysmacBusNumberDuplication,
    /// Memory status error.
    MemoryStatusError,
    /// SYSMAC BUS terminator missing.
    SysmacBusTerminatorMissing,

    // 0x26 command error
    /// No protection.
    NoProtection,
    /// Incorrect password.
    IncorrectPassword,
    /// Protected.
    Protected,
    /// Service already executing.
    ServiceAlreadyExecuting,
    /// Service stopped.
    ServiceStopped,
    /// No execution right.
    NoExecutionRight,
    /// Settings not complete.
    SettingsNotComplete,
    /// Necessary items not set.
    NecessaryItemsNotSet,
    /// Number already defined.
    NumberAlreadyDefined,
    /// Error will not clear.
    ErrorWillNotClear,

    // 0x30 access right error
    /// No access right.
    NoAccessRight,

    // 0x40 abort
    /// Service aborted.
    ServiceAborted,
}

impl EndCode {
    /// Looks up a masked `(main, sub)` pair.
    ///
    /// Returns `None` for pairs that have no entry in the table.
    pub fn from_codes(main: u8, sub: u8) -> Option<Self> {
        use EndCode::*;

        let code = match (main, sub) {
            (0x01, 0x01) => LocalNodeNotInNetwork,
            (0x01, 0x02) => TokenTimeout,
            (0x01, 0x03) => RetriesFailed,
            (0x01, 0x04) => TooManySendFrames,
            (0x01, 0x05) => NodeAddressRangeError,
            (0x01, 0x06) => NodeAddressDuplication,

            (0x02, 0x01) => DestinationNodeNotInNetwork,
            (0x02, 0x02) => UnitMissing,
            (0x02, 0x03) => ThirdNodeMissing,
            (0x02, 0x04) => DestinationNodeBusy,
            (0x02, 0x05) => ResponseTimeout,

            (0x03, 0x01) => CommunicationsControllerError,
            (0x03, 0x02) => CpuUnitError,
            (0x03, 0x03) => ControllerError,
            (0x03, 0x04) => UnitNumberError,

            (0x04, 0x01) => UndefinedCommand,
            (0x04, 0x02) => NotSupportedByModel,

            (0x05, 0x01) => DestinationAddressSettingError,
            (0x05, 0x02) => NoRoutingTables,
            (0x05, 0x03) => RoutingTableError,
            (0x05, 0x04) => TooManyRelays,

            (0x10, 0x01) => CommandTooLong,
            (0x10, 0x02) => CommandTooShort,
            (0x10, 0x03) => ElementsDataMismatch,
            (0x10, 0x04) => CommandFormatError,
            (0x10, 0x05) => HeaderError,

            (0x11, 0x01) => AreaClassificationMissing,
            (0x11, 0x02) => AccessSizeError,
            (0x11, 0x03) => AddressRangeError,
            (0x11, 0x04) => AddressRangeExceeded,
            (0x11, 0x06) => ProgramMissing,
            (0x11, 0x09) => RelationalError,
            (0x11, 0x0A) => DuplicateDataAccess,
            (0x11, 0x0B) => ResponseTooLong,
            (0x11, 0x0C) => ParameterError,

            (0x20, 0x02) => ReadProtected,
            (0x20, 0x03) => ReadTableMissing,
            (0x20, 0x04) => ReadDataMissing,
            (0x20, 0x05) => ReadProgramMissing,
            (0x20, 0x06) => ReadFileMissing,
            (0x20, 0x07) => ReadDataMismatch,

            (0x21, 0x01) => WriteReadOnly,
            (0x21, 0x02) => WriteProtected,
            (0x21, 0x03) => WriteCannotRegister,
            (0x21, 0x05) => WriteProgramMissing,
            (0x21, 0x06) => WriteFileMissing,
            (0x21, 0x07) => WriteFileNameExists,
            (0x21, 0x08) => WriteCannotChange,

            (0x22, 0x01) => NotPossibleDuringExecution,
            (0x22, 0x02) => NotPossibleWhileRunning,
            (0x22, 0x03) => WrongModeProgram,
            (0x22, 0x04) => WrongModeDebug,
            (0x22, 0x05) => WrongModeMonitor,
            (0x22, 0x06) => WrongModeRun,
            (0x22, 0x07) => NotPollingNode,
            (0x22, 0x08) => StepCannotBeExecuted,

            (0x23, 0x01) => FileDeviceMissing,
            (0x23, 0x02) => MemoryMissing,
            (0x23, 0x03) => ClockMissing,

            (0x24, 0x01) => TableMissing,

            (0x25, 0x02) => UnitMemoryError,
            (0x25, 0x03) => IoSettingError,
            (0x25, 0x04) => TooManyIoPoints,
            (0x25, 0x05) => CpuBusError,
            (0x25, 0x06) => IoDuplication,
            (0x25, 0x07) => IoBusError,
            (0x25, 0x09) => SysmacBus2Error,
            (0x25, 0x0A) => CpuBusUnitError,
            (0x25, 0x0D) => SysmacBusNumberDuplication,
            (0x25, 0x0F) => MemoryStatusError,
            (0x25, 0x10) => SysmacBusTerminatorMissing,

            (0x26, 0x01) => NoProtection,
            (0x26, 0x02) => IncorrectPassword,
            (0x26, 0x04) => Protected,
            (0x26, 0x05) => ServiceAlreadyExecuting,
            (0x26, 0x06) => ServiceStopped,
            (0x26, 0x07) => NoExecutionRight,
            (0x26, 0x08) => SettingsNotComplete,
            (0x26, 0x09) => NecessaryItemsNotSet,
            (0x26, 0x0A) => NumberAlreadyDefined,
            (0x26, 0x0B) => ErrorWillNotClear,

            (0x30, 0x01) => NoAccessRight,

            (0x40, 0x01) => ServiceAborted,

            _ => return None,
        };

        Some(code)
    }

    /// Returns the category of the main response code.
    pub fn category(self) -> &'static str {
        use EndCode::*;

        match self {
            LocalNodeNotInNetwork | TokenTimeout | RetriesFailed | TooManySendFrames
            | NodeAddressRangeError | NodeAddressDuplication => "Local node error",
            DestinationNodeNotInNetwork | UnitMissing | ThirdNodeMissing
            | DestinationNodeBusy | ResponseTimeout => "Destination node error",
            CommunicationsControllerError | CpuUnitError | ControllerError | UnitNumberError => {
                "Controller error"
            }
            UndefinedCommand | NotSupportedByModel => "Service unsupported",
            DestinationAddressSettingError | NoRoutingTables | RoutingTableError
            | TooManyRelays => "Routing table error",
            CommandTooLong | CommandTooShort | ElementsDataMismatch | CommandFormatError
            | HeaderError => "Command format error",
            AreaClassificationMissing | AccessSizeError | AddressRangeError
            | AddressRangeExceeded | ProgramMissing | RelationalError | DuplicateDataAccess
            | ResponseTooLong | ParameterError => "Parameter error",
            ReadProtected | ReadTableMissing | ReadDataMissing | ReadProgramMissing
            | ReadFileMissing | ReadDataMismatch => "Read not possible",
            WriteReadOnly | WriteProtected | WriteCannotRegister | WriteProgramMissing
            | WriteFileMissing | WriteFileNameExists | WriteCannotChange => "Write not possible",
            NotPossibleDuringExecution | NotPossibleWhileRunning | WrongModeProgram
            | WrongModeDebug | WrongModeMonitor | WrongModeRun | NotPollingNode
            | StepCannotBeExecuted => "Not executable in current mode",
            FileDeviceMissing | MemoryMissing | ClockMissing => "No such device",
            TableMissing => "Cannot start/stop",
            UnitMemoryError | IoSettingError | TooManyIoPoints | CpuBusError | IoDuplication
            | IoBusError | SysmacBus2Error | CpuBusUnitError | SysmacBusNumberDuplication
            | MemoryStatusError | SysmacBusTerminatorMissing => "Unit error",
            NoProtection | IncorrectPassword | Protected | ServiceAlreadyExecuting
            | ServiceStopped | NoExecutionRight | SettingsNotComplete | NecessaryItemsNotSet
            | NumberAlreadyDefined | ErrorWillNotClear => "Command error",
            NoAccessRight => "Access right error",
            ServiceAborted => "Abort",
        }
    }

    /// Returns a short description of the specific condition.
    pub fn description(self) -> &'static str {
        use EndCode::*;

        match self {
            LocalNodeNotInNetwork => "local node not in network",
            TokenTimeout => "token timeout",
            RetriesFailed => "retries failed",
            TooManySendFrames => "too many send frames",
            NodeAddressRangeError => "node address range error",
            NodeAddressDuplication => "node address duplication",
            DestinationNodeNotInNetwork => "destination node not in network",
            UnitMissing => "unit missing",
            ThirdNodeMissing => "third node missing",
            DestinationNodeBusy => "destination node busy",
            ResponseTimeout => "response timeout",
            CommunicationsControllerError => "communications controller error",
            CpuUnitError => "CPU unit error",
            ControllerError => "controller error",
            UnitNumberError => "unit number error",
            UndefinedCommand => "undefined command",
            NotSupportedByModel => "not supported by model/version",
            DestinationAddressSettingError => "destination address setting error",
            NoRoutingTables => "no routing tables",
            RoutingTableError => "routing table error",
            TooManyRelays => "too many relays",
            CommandTooLong => "command too long",
            CommandTooShort => "command too short",
            ElementsDataMismatch => "elements/data don't match",
            CommandFormatError => "command format error",
            HeaderError => "header error",
            AreaClassificationMissing => "area classification missing",
            AccessSizeError => "access size error",
            AddressRangeError => "address range error",
            AddressRangeExceeded => "address range exceeded",
            ProgramMissing => "program missing",
            RelationalError => "relational error",
            DuplicateDataAccess => "duplicate data access",
            ResponseTooLong => "response too long",
            ParameterError => "parameter error",
            ReadProtected => "protected",
            ReadTableMissing => "table missing",
            ReadDataMissing => "data missing",
            ReadProgramMissing => "program missing",
            ReadFileMissing => "file missing",
            ReadDataMismatch => "data mismatch",
            WriteReadOnly => "read only",
            WriteProtected => "protected",
            WriteCannotRegister => "cannot register",
            WriteProgramMissing => "program missing",
            WriteFileMissing => "file missing",
            WriteFileNameExists => "file name already exists",
            WriteCannotChange => "cannot change",
            NotPossibleDuringExecution => "not possible during execution",
            NotPossibleWhileRunning => "not possible while running",
            WrongModeProgram => "wrong PLC mode (program)",
            WrongModeDebug => "wrong PLC mode (debug)",
            WrongModeMonitor => "wrong PLC mode (monitor)",
            WrongModeRun => "wrong PLC mode (run)",
            NotPollingNode => "specified node not polling node",
            StepCannotBeExecuted => "step cannot be executed",
            FileDeviceMissing => "file device missing",
            MemoryMissing => "memory missing",
            ClockMissing => "clock missing",
            TableMissing => "table missing",
            UnitMemoryError => "memory error",
            IoSettingError => "I/O setting error",
            TooManyIoPoints => "too many I/O points",
            CpuBusError => "CPU bus error",
            IoDuplication => "I/O duplication",
            IoBusError => "I/O bus error",
            SysmacBus2Error => "SYSMAC BUS/2 error",
            CpuBusUnitError => "CPU bus unit error",
            SysmacBusNumberDuplication => "SYSMAC BUS number duplication",
            MemoryStatusError => "memory status error",
            SysmacBusTerminatorMissing => "SYSMAC BUS terminator missing",
            NoProtection => "no protection",
            IncorrectPassword => "incorrect password",
            Protected => "protected",
            ServiceAlreadyExecuting => "service already executing",
            ServiceStopped => "service stopped",
            NoExecutionRight => "no execution right",
            SettingsNotComplete => "settings not complete",
            NecessaryItemsNotSet => "necessary items not set",
            NumberAlreadyDefined => "number already defined",
            ErrorWillNotClear => "error will not clear",
            NoAccessRight => "no access right",
            ServiceAborted => "service aborted",
        }
    }
}

impl fmt::Display for EndCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.category(), self.description())
    }
}
